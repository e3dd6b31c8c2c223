use signalbridge::{SignalBridgeClientBuilder, TransactionKind, TransactionQuery};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = SignalBridgeClientBuilder::from_env()?.build()?;

    let mut query = TransactionQuery {
        kind: std::env::var("SIGNALBRIDGE_TXN_TYPE")
            .ok()
            .map(|it| TransactionKind::from_wire(&it)),
        ..Default::default()
    };

    loop {
        let page = client.get_transactions(&query).await?;
        for txn in &page.transactions {
            println!(
                "{} {:>8} {:>12} {}",
                txn.created_at.as_deref().unwrap_or("-"),
                txn.kind.as_str(),
                txn.amount.format_fixed(2),
                txn.description.as_deref().unwrap_or("")
            );
        }
        if !page.has_more() {
            break;
        }
        query.page = page.current_page + 1;
    }

    Ok(())
}
