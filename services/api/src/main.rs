use carbon_market_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("carbon market error: {err}");
        std::process::exit(1);
    }
}
