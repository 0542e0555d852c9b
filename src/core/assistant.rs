//! Studio assistant personas and the wire types shared with the model adapter.
//!

use crate::core::catalog::ServiceModel;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Instruction sent together with every consultation photo.
pub const CONSULTANCY_INSTRUCTION: &str =
    "Analise este rosto e recomende o melhor estilo de cílios do catálogo Havilah.";

/// Returned to the client when the model answers a consultation with no text.
pub const EMPTY_ANALYSIS_FALLBACK: &str = "Não foi possível analisar a imagem.";

const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

const CHAT_PERSONA: &str = r#"You are the virtual assistant for Havilah Lash Studio, a premium luxury lash extension salon by Rebecca Havilah.
Your tone is elegant, sophisticated, welcoming, and knowledgeable.
You help clients choose lash styles from the following catalog: {% for model in models %}{{ model.name }}{% if not loop.last %}, {% endif %}{% endfor %}.
You explain aftercare procedures (washing with neutral soap, brushing, avoiding oil).
You encourage booking but do not process payments directly.
Always maintain a 'premium service' persona. Use formatting like bullet points for clarity.
If asked about prices, you can mention ranges but encourage checking the 'Valores' section for specifics.
"#;

const CONSULTANCY_PERSONA: &str = r#"You are an expert Lash Designer consultant for Havilah Lash Studio.
Analyze the provided image of a person's face/eyes.
Based on their eye shape (almond, round, hooded, monolid, etc.) and facial features, recommend the BEST 2 options from the following list:
{% for model in models %}{{ model.name }}: {{ model.description }}{% if not loop.last %}; {% endif %}{% endfor %}

Format your response exactly as follows:
**Análise do Olhar:** [Brief analysis of eye shape]
**Recomendação 1:** [Model Name] - [Reasoning]
**Recomendação 2:** [Model Name] - [Reasoning]
**Dica de Estilo:** [A short premium styling tip]

Keep the tone highly professional, flattering, and technical yet accessible. Portuguese language only.
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One replayed exchange, as sent to the chat relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,
    #[error("image payload is not valid base64")]
    InvalidEncoding,
}

/// A photo ready to be attached inline to a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 data without any `data:` prefix.
    pub data: String,
}

impl InlineImage {
    /// Accepts either raw base64 or a `data:<mime>;base64,<data>` URL.
    pub fn from_payload(payload: &str) -> Result<Self, ImageError> {
        let payload = payload.trim();

        let (mime_type, data) = match payload
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
        {
            Some((header, data)) => {
                let mime = header
                    .strip_suffix(";base64")
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or(DEFAULT_IMAGE_MIME_TYPE);
                (mime.to_owned(), data)
            }
            None => (DEFAULT_IMAGE_MIME_TYPE.to_owned(), payload),
        };

        if data.is_empty() {
            return Err(ImageError::Empty);
        }

        let decoded = STANDARD
            .decode(data)
            .map_err(|_| ImageError::InvalidEncoding)?;
        if decoded.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self {
            mime_type,
            data: data.to_owned(),
        })
    }
}

/// Renders the fixed system instructions from the current catalog.
pub struct Personas {
    env: minijinja::Environment<'static>,
}

impl Personas {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = minijinja::Environment::new();
        env.set_trim_blocks(true);
        env.add_template("chat", CHAT_PERSONA)?;
        env.add_template("consultancy", CONSULTANCY_PERSONA)?;

        Ok(Self { env })
    }

    pub fn chat(&self, models: &[ServiceModel]) -> Result<String, minijinja::Error> {
        self.render("chat", models)
    }

    pub fn consultancy(&self, models: &[ServiceModel]) -> Result<String, minijinja::Error> {
        self.render("consultancy", models)
    }

    fn render(&self, name: &str, models: &[ServiceModel]) -> Result<String, minijinja::Error> {
        let models: Vec<minijinja::Value> = models
            .iter()
            .map(|m| {
                minijinja::context! {
                    name => &m.name,
                    description => &m.description
                }
            })
            .collect();

        self.env
            .get_template(name)?
            .render(minijinja::context! { models => models })
    }
}
