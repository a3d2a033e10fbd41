//! AWS Lambda function for K2 bus arrivals.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    t3_lambda_bus::run().await
}
