use std::path::Path;

use mergeconf::{ConfigTree, Context, DeferredHandle};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Listen {
    addr: String,
    port: u16,
}

fn main() -> Result<(), mergeconf::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Handed out before any file is read.
    let mut settings = DeferredHandle::new();
    println!("initialized before load: {}", settings.is_initialized());

    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    let tree = ConfigTree::builder()
        .context(Context::new().with("here", here.display()))
        .with_file(here.join("demos/default.yaml"), true)
        .with_file(here.join("demos/local.yaml"), false)
        .with_env("TUTORIAL", "__")
        .build()?;
    settings.initialize_with(tree)?;

    let app = settings.get("app")?.section()?;
    let listen: Listen = app.get("listen")?.deserialize()?;

    println!("app: {}", app.get("name")?.as_str().unwrap_or_default());
    println!("data dir: {}", app.get("data_dir")?.as_str().unwrap_or_default());
    println!("listening on {}:{}", listen.addr, listen.port);
    println!(
        "log level: {}",
        settings
            .get_path(&["logging", "level"])?
            .as_str()
            .unwrap_or_default()
    );

    for language in app.get("languages")?.sequence()?.iter() {
        match language.as_str() {
            Some(name) => println!("language: {name}"),
            None => {
                let entry = language.section()?;
                println!(
                    "language: {} ({})",
                    entry.get("language")?.as_str().unwrap_or_default(),
                    entry.get("country")?.as_str().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
