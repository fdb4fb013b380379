use megapang_api::{
    config::ServerConfig,
    routes::recommend_api,
    server::{init_tracing, serve},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let server = ServerConfig::from_env(3005);
    serve(recommend_api(), &server, "recommend-api").await
}
