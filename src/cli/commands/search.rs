//! Implementation of the `quorum search` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::output::{format_history_table, output, CommandOutput};
use crate::domain::models::{Citation, GroundedAnswer};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// One or more queries; multiple queries run as a concurrent batch
    #[arg(required = true)]
    pub queries: Vec<String>,

    /// Treat the inputs as claims to verify instead of queries
    #[arg(long)]
    pub verify: bool,

    /// Show the in-process activity history after a batch
    #[arg(long)]
    pub show_history: bool,
}

#[derive(Debug, serde::Serialize)]
struct SearchItem {
    query: String,
    answer: Option<String>,
    citations: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchOutput {
    items: Vec<SearchItem>,
    history: Option<String>,
}

impl From<Result<GroundedAnswer, crate::domain::errors::DomainError>> for SearchItem {
    fn from(result: Result<GroundedAnswer, crate::domain::errors::DomainError>) -> Self {
        match result {
            Ok(answer) => SearchItem {
                query: answer.query,
                answer: Some(answer.answer),
                citations: answer.citations.into_iter().map(|c: Citation| c.url).collect(),
                error: None,
            },
            Err(e) => SearchItem {
                query: String::new(),
                answer: None,
                citations: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for item in &self.items {
            match (&item.answer, &item.error) {
                (Some(answer), _) => {
                    lines.push(answer.clone());
                    if !item.citations.is_empty() {
                        lines.push("Sources:".to_string());
                        for url in &item.citations {
                            lines.push(format!("  - {url}"));
                        }
                    }
                }
                (None, Some(error)) => lines.push(format!("error: {error}")),
                _ => {}
            }
            lines.push(String::new());
        }
        if let Some(history) = &self.history {
            lines.push(history.clone());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SearchArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let service = ctx.search_service()?;

    let items: Vec<SearchItem> = if args.verify {
        let verified = service.verify_batch(&args.queries).await?;
        verified
            .into_iter()
            .map(|v| SearchItem {
                query: v.claim,
                answer: v.verdict,
                citations: v.citations.into_iter().map(|c| c.url).collect(),
                error: v.error,
            })
            .collect()
    } else if args.queries.len() == 1 {
        let mut item: SearchItem = service.search(&args.queries[0]).await.into();
        if item.query.is_empty() {
            item.query.clone_from(&args.queries[0]);
        }
        vec![item]
    } else {
        let results = service.search_batch(&args.queries).await?;
        args.queries
            .iter()
            .zip(results)
            .map(|(query, result)| {
                let mut item: SearchItem = result.into();
                if item.query.is_empty() {
                    item.query.clone_from(query);
                }
                item
            })
            .collect()
    };

    let history = if args.show_history {
        Some(format_history_table(&service.recent_history(20).await))
    } else {
        None
    };

    output(&SearchOutput { items, history }, json_mode);
    Ok(())
}
