//! Prompt templates rendered with tera

use crate::config::{CompanyConfig, SenderConfig};
use crate::contacts::Contact;
use crate::error::Result;
use serde::Serialize;
use tera::{Context, Tera};

const SYSTEM_TEMPLATE: &str = "system";
const USER_TEMPLATE: &str = "user";

const SYSTEM_PROMPT: &str = "\
You are {{ sender.name }}, {{ sender.title }} of {{ company.name }} and creator of \
{{ sender.product_name }}. Write every outreach email as yourself, in the first person \
(I/me), never in the third person. Reply with a JSON object holding exactly the keys \
\"subject\" and \"body\". Leave out HTML, signatures, resource sections and disclaimers.";

const USER_PROMPT: &str = "\
Write a personalized investor outreach email about {{ sender.product_name }} for the \
contact below.

Voice:
- First person throughout. Never write about {{ sender.name }} in the third person.
- Narrative prose paragraphs. No headings, no bullet points, no \"Founder note\".
- Concise, specific and confident without sounding like a sales pitch.
{% if sender.product_briefing %}
About {{ sender.product_name }}:
{{ sender.product_briefing }}
{% endif %}
Meetings:
- I am based in {{ sender.city }}, {{ sender.state }} and available remotely to every investor.

Contact:
- Name: {{ contact.name }}
- Firm: {{ contact.firm }}
- Email username: {{ contact.username }}
- Title: {{ contact.title }}
- Investment type: {{ contact.kind }}
- Location: {{ contact.location }}

Organization research:
{{ company_info | default(value=\"N/A\") }}

Requirements:
- Output JSON only, shaped as {\"subject\": \"...\", \"body\": \"...\"}.
- The body is plain text with paragraph breaks, 250 to 300 words.
- Open with a hook tied to the firm's thesis or portfolio using the research above.
- Use a preferred nickname if the email username or research suggests one.
- Close with a clear call to action that mentions remote availability and {{ sender.city }}.";

/// System instruction and per-contact prompt for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct ContactView<'a> {
    name: &'a str,
    firm: &'a str,
    username: &'a str,
    title: &'a str,
    kind: &'a str,
    location: &'a str,
}

/// Renders the fixed prompt pair for each contact
pub struct PromptEngine {
    tera: Tera,
    sender: SenderConfig,
    company: CompanyConfig,
}

impl PromptEngine {
    pub fn new(sender: &SenderConfig, company: &CompanyConfig) -> Result<Self> {
        let mut tera = Tera::default();
        // Prompts are plain text.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(SYSTEM_TEMPLATE, SYSTEM_PROMPT)?;
        tera.add_raw_template(USER_TEMPLATE, USER_PROMPT)?;

        Ok(Self {
            tera,
            sender: sender.clone(),
            company: company.clone(),
        })
    }

    /// Render the prompt pair for a contact and its enrichment text
    pub fn render(&self, contact: &Contact, company_info: &str) -> Result<RenderedPrompt> {
        let mut context = Context::new();
        context.insert("sender", &self.sender);
        context.insert("company", &self.company);
        context.insert(
            "contact",
            &ContactView {
                name: &contact.name,
                firm: &contact.firm,
                username: contact.username(),
                title: &contact.title,
                kind: &contact.kind,
                location: &contact.location,
            },
        );
        if !company_info.trim().is_empty() {
            context.insert("company_info", company_info.trim());
        }

        Ok(RenderedPrompt {
            system: self.tera.render(SYSTEM_TEMPLATE, &context)?,
            user: self.tera.render(USER_TEMPLATE, &context)?,
        })
    }
}
