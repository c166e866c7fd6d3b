use crate::client::SyncClient;
use anyhow::{Result, anyhow};
use inboxcore::net::HttpRequest;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AiAgentStatus {
    ai_agent_enabled: bool,
}

/// Boundary contract for the per-chat AI-agent toggle. Consumed by the
/// settings panel, not by the sync pipeline itself.
impl SyncClient {
    pub async fn ai_agent_enabled(&self, chat_id: &str) -> Result<bool> {
        let url = format!(
            "{}/api/dashboard/chats/{}/ai-agent",
            self.config.api_base, chat_id
        );
        let response = self.http_client.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(anyhow!(
                "ai-agent status for chat {chat_id}: HTTP {}",
                response.status_code
            ));
        }
        let status: AiAgentStatus = response.json()?;
        Ok(status.ai_agent_enabled)
    }

    pub async fn set_ai_agent_enabled(&self, chat_id: &str, enabled: bool) -> Result<()> {
        let url = format!(
            "{}/api/dashboard/chats/{}/ai-agent",
            self.config.api_base, chat_id
        );
        let body = serde_json::json!({ "enabled": enabled });
        let request = HttpRequest::patch(url).with_json_body(body.to_string().into_bytes());
        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(anyhow!(
                "ai-agent toggle for chat {chat_id}: HTTP {}",
                response.status_code
            ));
        }
        Ok(())
    }
}
