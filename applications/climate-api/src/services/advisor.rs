use crate::error::{AppError, Result};
use crate::repositories::LogRepository;
use crate::services::analysis::{analyze, Analysis};
use crate::services::completion::CompletionClient;
use crate::services::keywords::KeywordGate;

const ANALYSIS_WINDOW: i64 = 1000;

const OFF_TOPIC_MESSAGE: &str = "This system is specifically designed for farming and \
weather-related queries. Please ask a question related to farming or weather conditions.";

/// Answers farming questions against recent sensor history. Stateless per
/// call; there is no conversation memory.
#[derive(Clone)]
pub struct AdvisorService {
    repository: LogRepository,
    gate: KeywordGate,
    client: CompletionClient,
}

impl AdvisorService {
    pub fn new(repository: LogRepository, gate: KeywordGate, client: CompletionClient) -> Self {
        Self {
            repository,
            gate,
            client,
        }
    }

    pub async fn answer(&self, query: Option<String>) -> Result<String> {
        let query = match query {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(AppError::Validation("No query provided".to_string())),
        };

        if !self.gate.matches(&query) {
            return Err(AppError::Validation(OFF_TOPIC_MESSAGE.to_string()));
        }

        tracing::info!(query = %query, "handling advisory query");

        let entries = self.repository.recent(ANALYSIS_WINDOW).await?;
        let analysis = analyze(&entries);
        let prompt = compose_prompt(&query, &analysis)?;

        self.client.complete(&prompt).await
    }
}

fn compose_prompt(query: &str, analysis: &Analysis) -> Result<String> {
    let analysis_json = serde_json::to_string(analysis)?;
    Ok(format!(
        "User query: {query}\n\
         \n\
         Analyzed sensor data: {analysis_json}\n\
         \n\
         IMPORTANT INSTRUCTIONS FOR YOUR RESPONSE:\n\
         1. Use simple, clear language that farmers and non-technical users can easily understand\n\
         2. DO NOT use emojis, special symbols, or decorative characters\n\
         3. DO NOT use markdown formatting like **bold**, *italic*, or headers (###)\n\
         4. Keep sentences short and direct\n\
         5. Use bullet points with simple dashes (-) only when listing items\n\
         6. Focus on practical advice and clear recommendations\n\
         7. Avoid technical jargon - explain things in everyday terms\n\
         8. Give a straightforward YES or NO recommendation when appropriate\n\
         \n\
         Please provide a helpful response based on the sensor data analysis following these guidelines."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::FieldAnalysis;

    #[test]
    fn prompt_carries_query_and_analysis() {
        let analysis = Analysis {
            temperature: Some(FieldAnalysis {
                average: 22.5,
                minimum: 20.0,
                maximum: 25.0,
                standard_deviation: 1.5,
            }),
            humidity: None,
            pressure: None,
        };
        let prompt = compose_prompt("Is it a good day to sow?", &analysis).unwrap();
        assert!(prompt.starts_with("User query: Is it a good day to sow?"));
        assert!(prompt.contains("\"average\":22.5"));
        assert!(!prompt.contains("humidity"));
        assert!(prompt.contains("YES or NO recommendation"));
    }
}
