use std::{collections::HashMap, sync::Arc};

use pipeflow::{Catalog, ChannelEvent, ChannelOptions, Config, DiagramBuilder, Flavor, PipeSpec, catalog::StaticCatalog};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipeflow=debug"))).init();

    let config = Config::load_from_str(include_str!("./config.toml")).unwrap();
    let catalog = Catalog::from_json(include_str!("./catalog.json")).unwrap();

    let types: HashMap<String, String> = [("Logger", "FileWrite"), ("Fetch", "HttpCall")].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let icons: HashMap<String, String> = [("FileWrite", "media/file.svg")].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    let diagram = DiagramBuilder::new().config(config).types(types).icons(icons).catalog(Arc::new(StaticCatalog::new(catalog))).build().unwrap();

    ChannelEvent::channel(diagram.channel(), ChannelOptions::default()).unwrap().on_pipe_attributes(|e| {
        let mut model = e.pipe_model.write().unwrap();
        match e.name.as_str() {
            "Logger" => model.attributes.insert("write".to_string(), "out.log".to_string()),
            "Fetch" => model.attributes.insert("url".to_string(), "https://example.org".to_string()),
            _ => None,
        };
    });
    ChannelEvent::channel(diagram.channel(), ChannelOptions::default()).unwrap().on_resolved(|name, activity| {
        println!("{} resolved to {}", name, activity);
    });

    let logger = diagram.add_pipe(PipeSpec::new("Logger").position(120.0, 200.0).extra("out.log").description("writes every line"), Flavor::Activity).unwrap();
    let fetch = diagram.add_custom_pipe("Fetch", None, Flavor::Activity).unwrap();
    let receiver = diagram.add_pipe(PipeSpec::new("(receiver): Inbox").position(320.0, 200.0), Flavor::Activity).unwrap();
    diagram.add_pipe(PipeSpec::new("EXIT").position(520.0, 200.0).extra("done").exit(true), Flavor::Plain).unwrap();

    diagram.connect("Logger", "EXIT").unwrap();
    diagram.connect("Fetch", "Logger").unwrap();

    for view in [logger, fetch, receiver] {
        let activity = view.resolved().await;
        println!("{}: {:?}", view.name(), activity);
    }

    println!("{}", diagram.render());
}
