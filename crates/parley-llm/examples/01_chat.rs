use anyhow::Result;
use parley_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient};

#[tokio::main]
async fn main() -> Result<()> {
    let api_key = std::env::var("OPENAI_API_KEY")?;
    let client = OpenAIClient::new(api_key)?;

    let request = ChatRequest::new(
        "gpt-4o-mini",
        vec![
            Message::system("You are Support Bot. You are concise."),
            Message::human("What are your hours?"),
        ],
    )
    .with_options(ChatOptions::new().temperature(0.7).max_tokens(500));

    let response = client.chat(request).await?;

    println!("Response: {}", response.content.unwrap_or_default());

    if let Some(usage) = response.usage {
        println!("Tokens used: {}", usage.total_tokens);
    }

    Ok(())
}
