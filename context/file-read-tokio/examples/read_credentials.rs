use mpesa_core::Context;
use mpesa_file_read_tokio::TokioFileRead;

#[tokio::main]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "SandboxCertificate.cer".to_string());

    let ctx = Context::new().with_file_read(TokioFileRead);

    match ctx.file_read_as_string(&path).await {
        Ok(pem) => {
            let kind = if pem.contains("BEGIN CERTIFICATE") {
                "x509 certificate"
            } else if pem.contains("PUBLIC KEY") {
                "public key"
            } else {
                "unknown"
            };
            println!("{path}: {} bytes, looks like a {kind}", pem.len());
        }
        Err(e) => eprintln!("Failed to read {path}: {e}"),
    }
}
