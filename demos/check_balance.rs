use signalbridge::{Currency, SignalBridgeClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let currency = match std::env::var("SIGNALBRIDGE_CURRENCY") {
        Ok(code) => Currency::new(code)?,
        Err(_) => Currency::default(),
    };

    let client = SignalBridgeClientBuilder::from_env()?.build()?;
    let snapshot = client.get_balance(&currency).await?;
    println!(
        "balance: {} {} (credit limit {}, {} per segment)",
        snapshot.balance.format_fixed(2),
        snapshot.currency.as_str(),
        snapshot.credit_limit.format_fixed(2),
        snapshot.segment_price
    );

    let summary = client.get_balance_summary().await?;
    for (key, value) in summary.fields() {
        println!("  {key}: {value}");
    }

    Ok(())
}
