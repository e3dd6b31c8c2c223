use std::io;

use signalbridge::{Message, SignalBridgeClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recipients = std::env::var("SIGNALBRIDGE_RECIPIENTS").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SIGNALBRIDGE_RECIPIENTS environment variable is required (comma separated)",
        )
    })?;
    let body = std::env::var("SIGNALBRIDGE_MESSAGE")
        .unwrap_or_else(|_| "Hello from the signalbridge batch demo.".to_owned());

    let client = SignalBridgeClientBuilder::from_env()?
        .batch_concurrency(4)
        .build()?;

    let messages = recipients
        .split(',')
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .map(|to| Message::try_new(to, body.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let result = client.send_batch(&messages).await?;
    println!(
        "total: {}, successful: {}, failed: {}",
        result.total(),
        result.successful(),
        result.failed()
    );
    for (idx, failure) in result.failures() {
        println!("  {}: {failure}", messages[idx].recipient().raw());
    }

    Ok(())
}
