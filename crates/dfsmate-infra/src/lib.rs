//! Infrastructure for dfsmate: the docker exec runner, the JSONL audit
//! sink, the OpenRouter chat client, and configuration loading.

pub mod audit;
pub mod config;
pub mod exec;
pub mod llm;
