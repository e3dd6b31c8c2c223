use std::io;

use signalbridge::{Message, SignalBridgeClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recipient = std::env::var("SIGNALBRIDGE_RECIPIENT").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SIGNALBRIDGE_RECIPIENT environment variable is required",
        )
    })?;
    let body = std::env::var("SIGNALBRIDGE_MESSAGE")
        .unwrap_or_else(|_| "Hello from the signalbridge demo.".to_owned());
    let is_test = std::env::var("SIGNALBRIDGE_TEST").is_ok_and(|it| it == "1");

    let client = SignalBridgeClientBuilder::from_env()?.build()?;
    let estimate = client.segments(&body)?;
    println!(
        "encoding: {:?}, segments: {}",
        estimate.encoding, estimate.segment_count
    );

    let message = Message::try_new(recipient, body)?.as_test(is_test);
    match client.send_one(&message).await {
        Ok(delivery) => println!("id: {}, status: {}", delivery.id.as_str(), delivery.status),
        Err(err) => {
            eprintln!("send failed ({:?}): {err}", err.kind());
            if let Some(errors) = err.failure().and_then(|it| it.field_errors()) {
                for (field, messages) in errors.iter() {
                    eprintln!("  {field}: {}", messages.join("; "));
                }
            }
            return Err(err.into());
        }
    }

    Ok(())
}
