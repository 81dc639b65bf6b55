use crate::configuration::Configuration;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Consultation booking backend")]
pub struct ConfigurationHandler {
    /// Port the server listens on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: String,

    /// PostgreSQL connection URL. Consultations are kept in memory when omitted.
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Route serving the GraphQL API and GraphiQL
    #[arg(long, env = "GRAPHQL_PATH", default_value = "/api/graphql")]
    graphql_path: String,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn graphql_path(&self) -> String {
        self.graphql_path.clone()
    }
}
