//! Prompt construction for SQL generation.
//!
//! The instruction template, rules and few-shot examples are fixed data; the
//! only per-call input is the user's question.

use std::fmt::Write as _;

use mission_chat_core::constants::UNANSWERABLE_SENTINEL;
use mission_chat_core::{MatchStyle, SchemaDescriptor};

/// One question/answer pair shown to the model.
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub question: &'static str,
    pub sql: &'static str,
}

pub const FEW_SHOT_EXAMPLES: &[FewShotExample] = &[
    FewShotExample {
        question: "Show me all SpaceX missions in 2023",
        sql: "SELECT * FROM MISSIONS WHERE ORGANISATION = 'SpaceX' AND DATE LIKE '%2023%'",
    },
    FewShotExample {
        question: "List Indian missions",
        sql: "SELECT * FROM MISSIONS WHERE LOCATION LIKE '%INDIA%'",
    },
    FewShotExample {
        question: "How many missions did ISRO launch?",
        sql: "SELECT * FROM MISSIONS WHERE ORGANISATION = 'ISRO'",
    },
    FewShotExample {
        question: "List all unique launch locations.",
        sql: "SELECT DISTINCT LOCATION FROM MISSIONS",
    },
];

const PREAMBLE: &str = "You are an expert SQL generator AI. Your task is to convert English \
questions into valid SQLite queries for a database named {table}, based *only* on the schema \
and rules provided.";

/// Builds the complete prompt for `question`.
#[must_use]
pub fn build_sql_prompt(schema: &SchemaDescriptor, question: &str) -> String {
    build_prompt_with_examples(schema, FEW_SHOT_EXAMPLES, question)
}

#[must_use]
pub fn build_prompt_with_examples(
    schema: &SchemaDescriptor,
    examples: &[FewShotExample],
    question: &str,
) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(&PREAMBLE.replace("{table}", schema.table));
    prompt.push_str("\n\n");
    write_schema(&mut prompt, schema);
    prompt.push('\n');
    write_rules(&mut prompt, schema);
    prompt.push('\n');
    write_examples(&mut prompt, examples);
    let _ = write!(prompt, "\n\nUser Question: {}\nSQL Query:", question.trim());
    prompt
}

/// The exact reply the model is told to give for unanswerable questions.
#[must_use]
pub fn unanswerable_reply(schema: &SchemaDescriptor) -> String {
    format!(
        "{UNANSWERABLE_SENTINEL} Cannot answer this question with the available data ({}).",
        schema.column_list()
    )
}

fn write_schema(out: &mut String, schema: &SchemaDescriptor) {
    let _ = writeln!(out, "Database Schema:\nTable Name: {}\nColumns:", schema.table);
    for column in schema.columns {
        let examples = column
            .examples
            .iter()
            .map(|e| format!("'{e}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "- {} ({}): {} (e.g., {}).",
            column.name,
            column.column_type.as_sql(),
            column.description,
            examples
        );
    }
}

fn write_rules(out: &mut String, schema: &SchemaDescriptor) {
    let by_style = |style: MatchStyle| {
        schema
            .columns
            .iter()
            .filter(|c| c.match_style == style)
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let table = schema.table;

    out.push_str("Query Generation Rules:\n");
    let _ = writeln!(
        out,
        "- Target Table: Always query the `{table}` table. Do not invent tables or columns."
    );
    out.push_str(
        "- Column Selection: Default to `SELECT *` unless specific columns are requested. \
         Use `SELECT DISTINCT` for unique values if asked.\n",
    );
    let _ = writeln!(
        out,
        "- Filtering (`WHERE` clause): Use `LIKE '%value%'` for flexible text matching ({}). \
         Use exact matches for statuses ({}). Combine conditions with `AND`. Map country names \
         to likely ORGANISATION/LOCATION using `LIKE` and `OR`.",
        by_style(MatchStyle::Fuzzy),
        by_style(MatchStyle::Exact),
    );
    out.push_str(
        "- Ordering (`ORDER BY`): Generally avoid ordering by the text `DATE` column as it's \
         unreliable. Order by other columns if requested (`ORDER BY column ASC/DESC`).\n",
    );
    let _ = writeln!(
        out,
        "- Aggregation (Counts, etc.): Do not use `COUNT(*)`, `SUM()`, etc. If asked \"how many\", \
         select the relevant rows for the user to count (e.g., `SELECT * FROM {table} WHERE \
         ORGANISATION = 'SpaceX' AND MISSION_STATUS = 'Failure'`)."
    );
    let _ = writeln!(
        out,
        "- Ambiguity: If a question can't be answered with the schema, respond with '{}'",
        unanswerable_reply(schema)
    );
    out.push_str(
        "- Output Format: Provide *only* the raw, valid SQLite query. No extra text, \
         formatting, or semicolons at the end.\n",
    );
}

fn write_examples(out: &mut String, examples: &[FewShotExample]) {
    out.push_str("Examples:");
    for example in examples {
        let _ = write!(out, "\nQ: {}\nA: {}", example.question, example.sql);
    }
}
