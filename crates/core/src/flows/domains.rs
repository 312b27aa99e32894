//! Data-driven flow definitions: one [`FlowSpec`] per domain instead of three
//! hand-copied state machines. Field order is load-bearing — it fixes both
//! the extraction attempt order and the prompt order.

use crate::domain::Domain;
use crate::flows::engine::{FlowRecord, FlowReply};
use crate::flows::extract::Extractor;

pub struct FieldSpec {
    pub key: &'static str,
    pub required: bool,
    pub extractor: Extractor,
    pub prompt: fn(&FlowRecord) -> FlowReply,
}

pub struct FlowSpec {
    pub domain: Domain,
    pub fields: &'static [FieldSpec],
    pub affirmations: &'static [&'static str],
    pub summary: fn(&FlowRecord) -> FlowReply,
    pub confirmation_reprompt: &'static str,
    pub already_submitted: &'static str,
    pub success: &'static str,
}

impl FlowSpec {
    pub fn uses_slot_options(&self) -> bool {
        self.fields.iter().any(|field| field.extractor == Extractor::SlotChoice)
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|field| field.required).map(|field| field.key)
    }
}

pub fn flow_for(domain: Domain) -> &'static FlowSpec {
    match domain {
        Domain::Lead => &LEAD_FLOW,
        Domain::Support => &SUPPORT_FLOW,
        Domain::Schedule => &SCHEDULE_FLOW,
    }
}

// ---------------------------------------------------------------------------
// Lead capture
// ---------------------------------------------------------------------------

static LEAD_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        key: "name",
        required: true,
        extractor: Extractor::PersonName,
        prompt: prompt_lead_name,
    },
    FieldSpec {
        key: "email",
        required: true,
        extractor: Extractor::Email,
        prompt: prompt_lead_email,
    },
    FieldSpec {
        key: "company",
        required: true,
        extractor: Extractor::CompanyName,
        prompt: prompt_lead_company,
    },
    FieldSpec {
        key: "team_size",
        required: true,
        extractor: Extractor::TeamSize,
        prompt: prompt_lead_team_size,
    },
    FieldSpec {
        key: "interest",
        required: true,
        extractor: Extractor::FreeText,
        prompt: prompt_lead_interest,
    },
    FieldSpec {
        key: "budget",
        required: false,
        extractor: Extractor::Budget,
        prompt: prompt_lead_budget,
    },
];

static LEAD_FLOW: FlowSpec = FlowSpec {
    domain: Domain::Lead,
    fields: &LEAD_FIELDS,
    affirmations: &["sim", "correto", "isso mesmo", "perfeito", "ok"],
    summary: lead_summary,
    confirmation_reprompt: "Se precisar ajustar alguma informação é só me avisar. Está tudo correto para eu enviar ao time comercial?",
    already_submitted: "Dados já confirmados e enviados ao time comercial. Posso ajudar com algo mais?",
    success: "Perfeito, encaminhei os dados ao time comercial. Eles entrarão em contato em breve. Posso ajudar com algo mais?",
};

fn prompt_lead_name(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Perfeito! Qual é o seu nome completo?")
}

fn prompt_lead_email(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Obrigado. Pode compartilhar seu e-mail corporativo?")
}

fn prompt_lead_company(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Qual é o nome da sua empresa?")
}

fn prompt_lead_team_size(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Quantas pessoas aproximadas compõem a equipe ou squad que usaria a solução?")
}

fn prompt_lead_interest(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Poderia detalhar rapidamente o que você busca? (ex: tipo de projeto, objetivo)")
}

fn prompt_lead_budget(_: &FlowRecord) -> FlowReply {
    FlowReply::plain(
        "Se já tiver uma estimativa de orçamento, posso registrar. Caso não tenha, é só dizer que ainda não definiu.",
    )
}

fn lead_summary(record: &FlowRecord) -> FlowReply {
    let mut summary = format!(
        "Resumo do que anotei:\n- Nome: {}\n- E-mail: {}\n- Empresa: {}\n- Tamanho da equipe: {}\n- Interesse: {}",
        record.get("name").unwrap_or_default(),
        record.get("email").unwrap_or_default(),
        record.get("company").unwrap_or_default(),
        record.get("team_size").unwrap_or_default(),
        record.get("interest").unwrap_or_default(),
    );
    if let Some(budget) = record.get("budget") {
        summary.push_str(&format!("\n- Orçamento estimado: {budget}"));
    }
    summary.push_str(
        "\nPosso registrar esses dados no CRM para nosso time comercial? Usaremos somente para contato e acompanhamento.",
    );
    FlowReply::with_privacy_language(summary)
}

// ---------------------------------------------------------------------------
// Support ticket intake
// ---------------------------------------------------------------------------

static SUPPORT_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        key: "severity",
        required: true,
        extractor: Extractor::Severity,
        prompt: prompt_support_severity,
    },
    FieldSpec {
        key: "description",
        required: true,
        extractor: Extractor::FreeText,
        prompt: prompt_support_description,
    },
    FieldSpec {
        key: "contact",
        required: true,
        extractor: Extractor::Contact,
        prompt: prompt_support_contact,
    },
];

static SUPPORT_FLOW: FlowSpec = FlowSpec {
    domain: Domain::Support,
    fields: &SUPPORT_FIELDS,
    affirmations: &["sim", "pode enviar", "ok", "confirmo", "isso mesmo"],
    summary: support_summary,
    confirmation_reprompt: "Se precisar ajustar alguma informação do ticket é só avisar. Posso prosseguir com o envio para o suporte?",
    already_submitted: "O ticket já foi encaminhado ao suporte. Assim que possível retornaremos. Posso ajudar em mais algo?",
    success: "Perfeito, abri o ticket com nossa equipe de suporte. Retornaremos no contato informado. Posso ajudar com mais algo?",
};

fn prompt_support_severity(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Pode me informar a severidade? (baixa, média ou alta)")
}

fn prompt_support_description(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Poderia descrever rapidamente o que está ocorrendo?")
}

fn prompt_support_contact(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Qual e-mail ou telefone podemos usar para retorno?")
}

fn support_summary(record: &FlowRecord) -> FlowReply {
    FlowReply::with_privacy_language(format!(
        "Resumo do ticket:\n- Severidade: {}\n- Descrição: {}\n- Contato: {}\nPosso registrar isso com o suporte agora? Usaremos os dados apenas para esse atendimento.",
        record.get("severity").unwrap_or_default(),
        record.get("description").unwrap_or_default(),
        record.get("contact").unwrap_or_default(),
    ))
}

// ---------------------------------------------------------------------------
// Meeting scheduling
// ---------------------------------------------------------------------------

static SCHEDULE_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        key: "interest",
        required: true,
        extractor: Extractor::FreeText,
        prompt: prompt_schedule_interest,
    },
    FieldSpec {
        key: "slot",
        required: true,
        extractor: Extractor::SlotChoice,
        prompt: prompt_schedule_slot,
    },
    FieldSpec {
        key: "contact",
        required: true,
        extractor: Extractor::Contact,
        prompt: prompt_schedule_contact,
    },
];

static SCHEDULE_FLOW: FlowSpec = FlowSpec {
    domain: Domain::Schedule,
    fields: &SCHEDULE_FIELDS,
    affirmations: &["sim", "confirmo", "pode marcar", "fechar", "ok"],
    summary: schedule_summary,
    confirmation_reprompt: "Tudo certo para eu confirmar esse horário? Se preferir outro, é só mencionar.",
    already_submitted: "Agendamento confirmado anteriormente. Se precisar alterar, posso verificar disponibilidade. Posso ajudar com algo mais?",
    success: "Agenda confirmada! Você receberá o convite por e-mail em breve. Posso ajudar com mais alguma coisa?",
};

fn prompt_schedule_interest(_: &FlowRecord) -> FlowReply {
    FlowReply::plain("Qual assunto você gostaria de tratar na conversa?")
}

fn prompt_schedule_slot(record: &FlowRecord) -> FlowReply {
    let listing = record
        .options
        .iter()
        .enumerate()
        .map(|(index, slot)| format!("{}. {slot}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");
    FlowReply::plain(format!(
        "Tenho essas opções nos próximos dias:\n{listing}\nQual deles prefere? Basta indicar o número."
    ))
}

fn prompt_schedule_contact(_: &FlowRecord) -> FlowReply {
    FlowReply::with_privacy_language(
        "Qual e-mail ou telefone podemos usar para confirmar o convite? Os dados serão usados apenas para esse agendamento.",
    )
}

fn schedule_summary(record: &FlowRecord) -> FlowReply {
    FlowReply::plain(format!(
        "Ótimo! Anotei o interesse em {} e o horário {}. Podemos confirmar usando o contato {}?\nPosso finalizar o agendamento?",
        record.get("interest").unwrap_or_default(),
        record.get("slot").unwrap_or_default(),
        record.get("contact").unwrap_or_default(),
    ))
}
