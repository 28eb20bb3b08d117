//! Demo query service.
//!
//! Serves canned inventory answers chosen by keywords, so the tool can be
//! explored without a configured backend.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{DatabaseInfo, NaturalLanguageResponse, QueryService, Row, SqlResponse, FALLBACK_TABLES};
use crate::error::Result;

/// A canned answer: the SQL "generated" for a question and its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoAnswer {
    pub sql: String,
    pub results: Vec<Row>,
}

/// Query service that answers from built-in sample data.
#[derive(Debug, Clone, Default)]
pub struct DemoQueryService {
    /// Custom mappings (pattern -> answer), checked before the built-in ones.
    custom_answers: Vec<(String, DemoAnswer)>,
}

impl DemoQueryService {
    /// Name reported by [`QueryService::name`].
    pub const NAME: &'static str = "demo";

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom answer used when the input contains `pattern`.
    pub fn with_answer(
        mut self,
        pattern: impl Into<String>,
        sql: impl Into<String>,
        results: Vec<Row>,
    ) -> Self {
        self.custom_answers.push((
            pattern.into().to_lowercase(),
            DemoAnswer {
                sql: sql.into(),
                results,
            },
        ));
        self
    }

    /// Picks the answer for `input`.
    pub fn answer_for(&self, input: &str) -> DemoAnswer {
        let input = input.to_lowercase();

        for (pattern, answer) in &self.custom_answers {
            if input.contains(pattern.as_str()) {
                return answer.clone();
            }
        }

        if input.contains("nike") {
            return nike_answer();
        }
        if input.contains("stock") || input.contains("inventory") {
            return stock_answer();
        }
        if input.contains("revenue") || input.contains("sales") {
            return revenue_answer();
        }
        default_answer()
    }
}

#[async_trait]
impl QueryService for DemoQueryService {
    async fn health(&self) -> Result<()> {
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<NaturalLanguageResponse> {
        let answer = self.answer_for(question);
        Ok(NaturalLanguageResponse {
            answer: None,
            sql: answer.sql,
            execution_time: None,
            query: Some(question.to_string()),
            results: answer.results,
        })
    }

    async fn execute_sql(&self, sql: &str) -> Result<SqlResponse> {
        let answer = self.answer_for(sql);
        Ok(SqlResponse {
            row_count: Some(answer.results.len() as u64),
            results: answer.results,
            execution_time: None,
        })
    }

    async fn database_info(&self) -> Result<DatabaseInfo> {
        Ok(DatabaseInfo {
            tables: FALLBACK_TABLES.len() as u64,
            total_rows: 1247,
            last_sync: Some("demo data".to_string()),
        })
    }

    async fn tables(&self) -> Result<Vec<String>> {
        Ok(FALLBACK_TABLES.iter().map(|t| t.to_string()).collect())
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Builds a row from column/value pairs, keeping their order.
pub fn row<const N: usize>(cells: [(&str, Value); N]) -> Row {
    cells
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

fn shirt(id: u64, brand: &str, color: &str, size: &str, price: &str, stock: u64) -> Row {
    row([
        ("id", json!(id)),
        ("brand", json!(brand)),
        ("color", json!(color)),
        ("size", json!(size)),
        ("price", json!(price)),
        ("stock", json!(stock)),
    ])
}

fn nike_answer() -> DemoAnswer {
    DemoAnswer {
        sql: "SELECT * FROM t_shirts\nWHERE brand = 'Nike'\nORDER BY stock DESC;".to_string(),
        results: vec![
            shirt(1, "Nike", "White", "M", "$25.99", 150),
            shirt(2, "Nike", "Blue", "S", "$22.99", 234),
            shirt(3, "Nike", "Black", "L", "$27.99", 89),
        ],
    }
}

fn stock_answer() -> DemoAnswer {
    let total = |brand: &str, stock: u64| row([("brand", json!(brand)), ("total_stock", json!(stock))]);
    DemoAnswer {
        sql: "SELECT brand, SUM(stock) as total_stock\nFROM t_shirts\nGROUP BY brand\nORDER BY total_stock DESC;"
            .to_string(),
        results: vec![total("Nike", 473), total("Adidas", 312), total("Puma", 189)],
    }
}

fn revenue_answer() -> DemoAnswer {
    DemoAnswer {
        sql: "SELECT SUM(price * quantity) as revenue\nFROM orders\nWHERE date >= DATE_SUB(NOW(), INTERVAL 1 MONTH);"
            .to_string(),
        results: vec![row([("revenue", json!("$45,892.50"))])],
    }
}

fn default_answer() -> DemoAnswer {
    DemoAnswer {
        sql: "SELECT * FROM t_shirts\nLIMIT 5;".to_string(),
        results: vec![
            shirt(1, "Nike", "White", "M", "$25.99", 150),
            shirt(2, "Adidas", "Black", "L", "$29.99", 89),
            shirt(3, "Puma", "Red", "XL", "$27.99", 67),
            shirt(4, "Levi", "Navy", "M", "$34.99", 112),
            shirt(5, "Nike", "Blue", "S", "$22.99", 234),
        ],
    }
}
