//! services/api/src/adapters/commentary_llm.rs
//!
//! This module contains the adapter for AI theological commentary.
//! It implements the `CommentaryService` port from the `core` crate, keeping
//! the API key server-side: clients only ever talk to this service.

const CHAPTER_SYSTEM: &str = r#"Você é um renomado PhD em Teologia Bíblica, especialista em Exegese do Antigo (Hebraico) e do Novo Testamento (Grego Koinê).

Analise o capítulo fornecido pelo usuário.

Diretrizes Estritas:
1. Use o Método Gramático-Histórico.
2. Identifique o tema central e o fio narrativo do capítulo.
3. Evite superficialidade. Seja profundo, técnico mas acessível pastoralmente.

Gere APENAS um JSON puro (sem markdown, sem crases), seguindo exatamente este esquema:
{
  "theme": "O tema central do capítulo em uma ou duas frases.",
  "exegesis": "Análise textual do capítulo. Cite as palavras chaves no original (transliterado) e explique seu peso semântico.",
  "history": "O cenário histórico, cultural e literário. Quem é o autor? Onde isso se encaixa na narrativa maior do livro?",
  "theology": "A doutrina central que o capítulo ensina e como ela se conecta ao restante das Escrituras.",
  "application": "Uma aplicação homilética prática. Como essa verdade muda a segunda-feira do crente comum?"
}"#;

const VERSE_SYSTEM: &str = r#"Você é um renomado PhD em Teologia Bíblica, Especialista em Exegese do Antigo (Hebraico) e Novo Testamento (Grego Koinê).

Diretrizes Estritas:
1. Use o Método Gramático-Histórico.
2. Identifique nuances do original (ex: tempos verbais no grego como Aoristo/Imperfeito ou troncos verbais no hebraico).
3. Evite superficialidade. Seja profundo, técnico mas acessível pastoralmente.

Gere APENAS um JSON puro (sem markdown, sem crases), seguindo exatamente este esquema:
{
  "original": "Análise técnica do texto original. Cite as palavras chaves em Hebraico/Grego (transliterado) e explique a gramática e como ela altera o entendimento.",
  "context": "O cenário histórico, cultural e literário. Quem é o autor? Qual a tensão do momento?",
  "references": [
    {
      "ref": "Ex: Rm 5:1",
      "type": "Teologia Sistemática",
      "text": "Resumo do texto...",
      "reason": "A conexão doutrinária (ex: Justificação, Santificação, Aliança)."
    }
  ],
  "application": "Uma aplicação homilética poderosa, com um imperativo prático."
}"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use biblia_core::analysis::{decode_analysis, Analysis, AnalysisMode, AnalysisRequest};
use biblia_core::ports::{CommentaryService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CommentaryService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCommentaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCommentaryAdapter {
    /// Creates a new `OpenAiCommentaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn system_prompt(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Chapter => CHAPTER_SYSTEM,
        AnalysisMode::Verse => VERSE_SYSTEM,
    }
}

fn user_prompt(request: &AnalysisRequest) -> String {
    let passage = request.passage.trim();
    match (request.mode, &request.reference) {
        (AnalysisMode::Verse, Some(reference)) => format!(
            "REALIZAR ANÁLISE DO TEXTO: {reference} - \"{passage}\". Analise SOMENTE este versículo (não analise o capítulo inteiro)."
        ),
        (AnalysisMode::Verse, None) => format!(
            "Analise SOMENTE este versículo (não analise o capítulo inteiro): \"{passage}\""
        ),
        (AnalysisMode::Chapter, Some(reference)) => {
            format!("Analise este capítulo ({reference}): \"{passage}\"")
        }
        (AnalysisMode::Chapter, None) => format!("Analise este capítulo: \"{passage}\""),
    }
}

//=========================================================================================
// `CommentaryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CommentaryService for OpenAiCommentaryAdapter {
    /// Generates commentary for a passage and decodes it leniently; the model
    /// does not always honor the "pure JSON" instruction.
    async fn analyze(&self, request: &AnalysisRequest) -> PortResult<Analysis> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt(request.mode))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.4)
            .max_tokens(900u32)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Backend(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Backend("commentary response contained no text content".to_string())
            })?;

        decode_analysis(&content).map_err(|e| PortError::Backend(e.to_string()))
    }
}
