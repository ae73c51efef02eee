use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AtendeError, AtendeResult};
use crate::models::{Conversation, Message};
use crate::repo::AttendantRepository;

/// Attendant handoff over a single field (`attendant_id`) with an audit
/// trail: every executed transfer appends exactly one system message and
/// reassigns the attendant. Status is never touched here.
pub struct TransferProtocol {
    attendants: Arc<dyn AttendantRepository>,
}

impl TransferProtocol {
    pub fn new(attendants: Arc<dyn AttendantRepository>) -> Self {
        Self { attendants }
    }

    /// Execute a transfer in place. The target must resolve to a known
    /// attendant; the source degrades to its raw id in the audit text when
    /// it cannot be resolved. Self transfers are permitted and still
    /// audited.
    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        from_attendant_id: Uuid,
        to_attendant_id: Uuid,
        reason: Option<&str>,
    ) -> AtendeResult<Message> {
        let target = self
            .attendants
            .get(to_attendant_id)
            .await?
            .ok_or(AtendeError::AttendantNotFound(to_attendant_id))?;

        let from_name = match self.attendants.get(from_attendant_id).await? {
            Some(source) => source.name,
            None => from_attendant_id.to_string(),
        };

        let audit = Message::system(audit_text(&from_name, &target.name, reason));
        conversation.push_message(audit.clone());
        conversation.attendant_id = Some(target.id);

        info!(
            conversation_id = %conversation.id,
            from = %from_name,
            to = %target.name,
            "Conversation transferred"
        );

        Ok(audit)
    }
}

fn audit_text(from_name: &str, to_name: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.trim().is_empty() => format!(
            "{from_name} transferiu o atendimento para {to_name}. Motivo: {}",
            reason.trim()
        ),
        _ => format!("{from_name} transferiu o atendimento para {to_name}."),
    }
}
