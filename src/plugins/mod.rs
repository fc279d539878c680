pub mod npm_client;

pub use npm_client::NpmClient;
