pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn graphql_path(&self) -> String;
}
