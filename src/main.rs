use unify::app::App;
use unify::config::AppConfig;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let app = App::bootstrap(config).expect("app bootstrap failed");

    if let Some(firestore) = app.firestore() {
        tracing::info!(documents = %firestore.documents_url(), "firestore ready");
    }
    if let Some(maps) = app.maps() {
        tracing::info!(script = %maps.script_url(), "maps loader configured");
    }

    let mut paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        paths.push("/".into());
    }

    for path in paths {
        match app.router().push(path.as_str()).await {
            Ok(route) => println!("{path} -> {} [{}]", route.full_path(), app.router().document_title()),
            Err(e) => println!("{path} -> error: {e}"),
        }
    }
}
