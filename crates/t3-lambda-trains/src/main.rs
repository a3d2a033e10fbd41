//! AWS Lambda function for rail departure boards.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    t3_lambda_trains::run().await
}
