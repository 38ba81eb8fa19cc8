pub const TOP_LEVEL_DOMAIN: &str = "org";
pub const AUTHOR: &str = "nearby";
pub const APP_NAME: &str = "nearby";

pub const SERVER_CONFIG_FILE_NAME: &str = "server.toml";
pub const CLIENT_CONFIG_FILE_NAME: &str = "client.toml";

pub const UNIX_SOCKET_FILE_NAME: &str = "nearby.sock";
pub const DATASET_FILE_NAME: &str = "listings.json";
