//! Command-line interface.
//!
//! Every command maps onto one `Index` or `SearchTankClient` operation and
//! prints its outcome as JSON on stdout.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use chrono::SecondsFormat;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::AppError;
use search_tank_repository::{BatchResults, BulkDeleteResults, Index, SearchTankClient};
use search_tank_shared::{Document, IndexMetadata, IndexOptions, Query, Range};

#[derive(Parser, Debug)]
#[command(name = "search-tank")]
#[command(about = "Manage and query indexes of the hosted search service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service URL, overrides SEARCH_TANK_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Index the command applies to
    #[arg(long, short, global = true, env = "SEARCH_TANK_INDEX")]
    pub index: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the index
    Create {
        /// Allow searching without credentials
        #[arg(long)]
        public: bool,
        /// Wait until the index has started
        #[arg(long)]
        wait: bool,
    },
    /// Delete the index
    Delete,
    /// Print whether the index exists
    Exists,
    /// Print the index metadata
    Status,
    /// Add or replace documents
    Add(AddArgs),
    /// Delete documents by docid
    Remove {
        #[arg(required = true)]
        docids: Vec<String>,
    },
    /// Delete every document matching a query
    DeleteBySearch { query: String },
    /// Merge scoring variables into a document
    Variables {
        docid: String,
        /// INDEX=VALUE pairs
        #[arg(required = true, value_parser = parse_key_value::<u32, f32>)]
        variables: Vec<(u32, f32)>,
    },
    /// Merge categories into a document; an empty value removes the category
    Categories {
        docid: String,
        /// NAME=VALUE pairs
        #[arg(required = true, value_parser = parse_key_value::<String, String>)]
        categories: Vec<(String, String)>,
    },
    /// Pin a document as the first result for a query
    Promote { docid: String, query: String },
    /// Search the index
    Search(SearchArgs),
    /// Manage scoring functions
    Functions {
        #[command(subcommand)]
        command: FunctionCommands,
    },
    /// List the account's indexes
    Indexes,
}

#[derive(Subcommand, Debug)]
pub enum FunctionCommands {
    /// List registered functions
    List,
    /// Register or replace the function at a slot
    Add { slot: u32, definition: String },
    /// Remove the function at a slot
    Delete { slot: u32 },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Docid of a single document
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub docid: Option<String>,

    /// NAME=TEXT field of the single document
    #[arg(long = "field", value_parser = parse_key_value::<String, String>)]
    pub fields: Vec<(String, String)>,

    /// INDEX=VALUE scoring variable of the single document
    #[arg(long = "variable", value_parser = parse_key_value::<u32, f32>)]
    pub variables: Vec<(u32, f32)>,

    /// NAME=VALUE category of the single document
    #[arg(long = "category", value_parser = parse_key_value::<String, String>)]
    pub categories: Vec<(String, String)>,

    /// JSON file holding an array of documents
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    #[arg(long)]
    pub start: Option<u32>,

    #[arg(long)]
    pub len: Option<u32>,

    /// Scoring function slot
    #[arg(long)]
    pub function: Option<u32>,

    /// Fields to fetch, `*` for all
    #[arg(long, value_delimiter = ',')]
    pub fetch: Vec<String>,

    /// Fields to return snippets for
    #[arg(long, value_delimiter = ',')]
    pub snippet: Vec<String>,

    #[arg(long)]
    pub fetch_variables: bool,

    #[arg(long)]
    pub fetch_categories: bool,

    /// INDEX=VALUE query variable
    #[arg(long = "var", value_parser = parse_key_value::<u32, f32>)]
    pub variables: Vec<(u32, f32)>,

    /// NAME=VALUE category filter, repeat to accept several values
    #[arg(long = "category-filter", value_parser = parse_key_value::<String, String>)]
    pub category_filters: Vec<(String, String)>,

    /// INDEX=FLOOR:CEIL document variable filter, `*` for an open bound
    #[arg(long = "docvar-filter", value_parser = parse_range_filter)]
    pub docvar_filters: Vec<(u32, Range)>,

    /// SLOT=FLOOR:CEIL scoring function filter, `*` for an open bound
    #[arg(long = "function-filter", value_parser = parse_range_filter)]
    pub function_filters: Vec<(u32, Range)>,
}

impl SearchArgs {
    /// Build the query described by the arguments.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new(self.query.clone())
            .with_fetch_fields(self.fetch.iter().cloned())
            .with_snippet_fields(self.snippet.iter().cloned());
        query.start = self.start;
        query.len = self.len;
        query.function = self.function;
        query.fetch_variables = self.fetch_variables;
        query.fetch_categories = self.fetch_categories;

        for (index, value) in &self.variables {
            query = query.with_query_variable(*index, *value);
        }
        for (category, value) in &self.category_filters {
            query
                .category_filters
                .entry(category.clone())
                .or_default()
                .push(value.clone());
        }
        for (index, range) in &self.docvar_filters {
            query = query.with_docvar_filter(*index, *range);
        }
        for (slot, range) in &self.function_filters {
            query = query.with_function_filter(*slot, *range);
        }
        query
    }
}

impl AddArgs {
    /// Documents described by the arguments.
    pub fn documents(&self) -> Result<Vec<Document>, AppError> {
        if let Some(path) = &self.file {
            let raw = fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&raw)?);
        }

        let docid = self
            .docid
            .clone()
            .ok_or_else(|| AppError::input("either --docid or --file is required"))?;
        let document = Document::new(docid)
            .with_fields(self.fields.iter().cloned().collect())
            .with_variables(self.variables.iter().copied().collect())
            .with_categories(self.categories.iter().cloned().collect());
        Ok(vec![document])
    }
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_key_value<K, V>(raw: &str) -> Result<(K, V), String>
where
    K: FromStr,
    K::Err: std::fmt::Display,
    V: FromStr,
    V::Err: std::fmt::Display,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", raw))?;
    let key = key.parse().map_err(|e| format!("invalid key {:?}: {}", key, e))?;
    let value = value
        .parse()
        .map_err(|e| format!("invalid value {:?}: {}", value, e))?;
    Ok((key, value))
}

/// Parse an `INDEX=FLOOR:CEIL` argument.
pub fn parse_range_filter(raw: &str) -> Result<(u32, Range), String> {
    let (index, range): (u32, String) = parse_key_value(raw)?;
    let (floor, ceil) = range
        .split_once(':')
        .ok_or_else(|| format!("expected FLOOR:CEIL, got {:?}", range))?;

    let bound = |raw: &str| -> Result<Option<f64>, String> {
        match raw.trim() {
            "*" | "" => Ok(None),
            value => value
                .parse()
                .map(Some)
                .map_err(|e| format!("invalid bound {:?}: {}", value, e)),
        }
    };
    Ok((
        index,
        Range {
            floor: bound(floor)?,
            ceil: bound(ceil)?,
        },
    ))
}

/// Run a parsed command and print its outcome.
pub async fn run(cli: Cli, client: &SearchTankClient) -> anyhow::Result<()> {
    let output = execute(cli, client).await?;
    let rendered = serde_json::to_string_pretty(&output).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

/// Run a parsed command and return its outcome as JSON.
pub async fn execute(cli: Cli, client: &SearchTankClient) -> Result<Value, AppError> {
    let Cli { command, index, .. } = cli;
    let index = index.map(|name| client.index(name));
    let require_index = || {
        index
            .as_ref()
            .ok_or_else(|| AppError::input("--index (or SEARCH_TANK_INDEX) is required"))
    };

    let output = match command {
        Commands::Indexes => {
            let indexes = client.list_indexes().await?;
            let listing: BTreeMap<String, Value> = indexes
                .iter()
                .map(|(name, metadata)| (name.clone(), metadata_json(metadata)))
                .collect();
            json!(listing)
        }
        Commands::Create { public, wait } => {
            let index = require_index()?;
            let options = if public {
                IndexOptions::public()
            } else {
                IndexOptions::default()
            };
            index.create_with_options(options).await?;
            if wait {
                wait_until_started(index).await?;
            }
            metadata_json(&index.metadata().await?)
        }
        Commands::Delete => {
            let index = require_index()?;
            index.delete().await?;
            json!({ "deleted": index.name() })
        }
        Commands::Exists => json!({ "exists": require_index()?.exists().await? }),
        Commands::Status => {
            let index = require_index()?;
            index.refresh_metadata().await?;
            metadata_json(&index.metadata().await?)
        }
        Commands::Add(args) => {
            let index = require_index()?;
            let documents = args.documents()?;
            if args.file.is_none() && documents.len() == 1 {
                let document = &documents[0];
                index.add_document(document).await?;
                json!({ "added": document.docid })
            } else {
                batch_json(&index.add_documents(documents).await?)
            }
        }
        Commands::Remove { docids } => {
            let index = require_index()?;
            if docids.len() == 1 {
                index.delete_document(&docids[0]).await?;
                json!({ "deleted": docids[0] })
            } else {
                delete_json(&index.delete_documents(docids).await?)
            }
        }
        Commands::DeleteBySearch { query } => {
            require_index()?.delete_by_search(query.as_str()).await?;
            json!({ "deleted_by": query })
        }
        Commands::Variables { docid, variables } => {
            let variables: BTreeMap<u32, f32> = variables.into_iter().collect();
            require_index()?.update_variables(&docid, &variables).await?;
            json!({ "docid": docid, "variables": variables })
        }
        Commands::Categories { docid, categories } => {
            let categories: BTreeMap<String, String> = categories.into_iter().collect();
            require_index()?.update_categories(&docid, &categories).await?;
            json!({ "docid": docid, "categories": categories })
        }
        Commands::Promote { docid, query } => {
            require_index()?.promote(&docid, &query).await?;
            json!({ "promoted": docid, "query": query })
        }
        Commands::Search(args) => {
            let results = require_index()?.search(args.to_query()).await?;
            info!(matches = results.matches, "Search finished");
            serde_json::to_value(&results)?
        }
        Commands::Functions { command } => {
            let index = require_index()?;
            match command {
                FunctionCommands::List => json!(index.list_functions().await?),
                FunctionCommands::Add { slot, definition } => {
                    index.add_function(slot, &definition).await?;
                    json!({ "slot": slot, "definition": definition })
                }
                FunctionCommands::Delete { slot } => {
                    index.delete_function(slot).await?;
                    json!({ "deleted": slot })
                }
            }
        }
    };

    Ok(output)
}

/// Poll until the index reports started, or Ctrl-C.
async fn wait_until_started(index: &Index) -> Result<(), AppError> {
    loop {
        if index.has_started().await? {
            return Ok(());
        }
        info!(index = %index.name(), "Waiting for index to start");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted while waiting for index to start");
                return Err(AppError::input("interrupted"));
            }
        }
    }
}

fn metadata_json(metadata: &IndexMetadata) -> Value {
    json!({
        "code": metadata.code,
        "creation_time": metadata.creation_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "started": metadata.started,
        "size": metadata.size,
        "public_search": metadata.public_search,
    })
}

fn batch_json(results: &BatchResults) -> Value {
    json!({
        "total": results.total,
        "succeeded": results.succeeded,
        "failed": results.failed,
        "failures": results
            .failures()
            .map(|r| json!({
                "docid": r.docid,
                "error": r.error.as_ref().map(ToString::to_string),
            }))
            .collect::<Vec<_>>(),
    })
}

fn delete_json(results: &BulkDeleteResults) -> Value {
    json!({
        "total": results.total,
        "succeeded": results.succeeded,
        "failed": results.failed,
        "failures": results
            .failures()
            .map(|r| json!({
                "docid": r.docid,
                "error": r.error.as_ref().map(ToString::to_string),
            }))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_tank_repository::{ClientConfig, InMemoryIndexProvider};
    use std::sync::Arc;

    fn client() -> SearchTankClient {
        SearchTankClient::with_provider(
            Arc::new(InMemoryIndexProvider::new()),
            ClientConfig::default(),
        )
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("search-tank").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value::<u32, f32>("2=1.5"), Ok((2, 1.5)));
        assert_eq!(
            parse_key_value::<String, String>("color="),
            Ok(("color".to_string(), String::new()))
        );
        assert!(parse_key_value::<u32, f32>("x=1").is_err());
        assert!(parse_key_value::<String, String>("novalue").is_err());
    }

    #[test]
    fn test_parse_range_filter() {
        assert_eq!(parse_range_filter("0=1:5"), Ok((0, Range::new(1.0, 5.0))));
        assert_eq!(parse_range_filter("3=*:2.5"), Ok((3, Range::at_most(2.5))));
        assert_eq!(parse_range_filter("1=10:"), Ok((1, Range::at_least(10.0))));
        assert!(parse_range_filter("1=10").is_err());
    }

    #[test]
    fn test_search_args_to_query() {
        let cli = parse(&[
            "-i",
            "catalog",
            "search",
            "shoe",
            "--len",
            "5",
            "--fetch",
            "title,price",
            "--category-filter",
            "color=red",
            "--category-filter",
            "color=blue",
            "--docvar-filter",
            "0=*:100",
        ]);

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let query = args.to_query();
        assert_eq!(query.text, "shoe");
        assert_eq!(query.len, Some(5));
        assert_eq!(query.fetch_fields, vec!["title", "price"]);
        assert_eq!(query.category_filters["color"], vec!["red", "blue"]);
        assert_eq!(query.docvar_filters[&0], vec![Range::at_most(100.0)]);
    }

    #[test]
    fn test_add_args_single_document() {
        let cli = parse(&[
            "add",
            "--docid",
            "doc1",
            "--field",
            "title=Red shoe",
            "--variable",
            "0=3",
            "--category",
            "color=red",
        ]);

        let Commands::Add(args) = cli.command else {
            panic!("expected add command");
        };
        let documents = args.documents().unwrap();
        assert_eq!(
            documents,
            vec![Document::new("doc1")
                .with_field("title", "Red shoe")
                .with_variable(0, 3.0)
                .with_category("color", "red")]
        );
    }

    #[tokio::test]
    async fn test_index_is_required() {
        let result = execute(parse(&["exists"]), &client()).await;
        assert!(matches!(result, Err(AppError::InputError(_))));
    }

    #[tokio::test]
    async fn test_commands_against_memory_provider() {
        let client = client();

        let created = execute(parse(&["-i", "catalog", "create"]), &client)
            .await
            .unwrap();
        assert_eq!(created["started"], true);

        execute(
            parse(&["-i", "catalog", "add", "--docid", "doc1", "--field", "title=shoe"]),
            &client,
        )
        .await
        .unwrap();

        let results = execute(parse(&["-i", "catalog", "search", "shoe"]), &client)
            .await
            .unwrap();
        assert_eq!(results["matches"], 1);
        assert_eq!(results["hits"][0]["docid"], "doc1");

        let indexes = execute(parse(&["indexes"]), &client).await.unwrap();
        assert_eq!(indexes["catalog"]["size"], 1);

        let failed = execute(
            parse(&["-i", "catalog", "functions", "add", "1", "log("]),
            &client,
        )
        .await;
        assert!(matches!(failed, Err(AppError::IndexError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_wait_polls_until_started() {
        let provider = Arc::new(InMemoryIndexProvider::new().with_delayed_start());
        let client = SearchTankClient::with_provider(provider.clone(), ClientConfig::default());

        let starter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            provider.mark_started("catalog").await
        });

        let began = tokio::time::Instant::now();
        let created = execute(parse(&["-i", "catalog", "create", "--wait"]), &client)
            .await
            .unwrap();

        assert_eq!(created["started"], true);
        assert!(began.elapsed() >= Duration::from_secs(3));
        starter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_create_without_wait_reports_not_started() {
        let client = SearchTankClient::with_provider(
            Arc::new(InMemoryIndexProvider::new().with_delayed_start()),
            ClientConfig::default(),
        );

        let created = execute(parse(&["-i", "catalog", "create"]), &client)
            .await
            .unwrap();
        assert_eq!(created["started"], false);
    }
}
