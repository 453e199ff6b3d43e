//! Rule-based FAQ replies.
//!
//! The knowledge base is an ordered list: the first entry with any keyword
//! contained in the normalized question wins, regardless of how many keywords
//! other entries would match.

use serde::{Deserialize, Serialize};

/// One FAQ rule: any of `keywords` selects `response` under `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub keywords: Vec<String>,
    pub category: String,
    pub response: String,
}

impl KnowledgeEntry {
    #[must_use]
    pub fn new<K, S>(keywords: K, category: impl Into<String>, response: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            category: category.into(),
            response: response.into(),
        }
    }

    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized.contains(keyword.to_lowercase().as_str()))
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub category: &'a str,
    pub response: &'a str,
}

#[derive(Debug, Clone)]
pub struct KeywordResponder {
    entries: Vec<KnowledgeEntry>,
    default_response: String,
}

impl KeywordResponder {
    #[must_use]
    pub fn new(entries: Vec<KnowledgeEntry>, default_response: impl Into<String>) -> Self {
        Self {
            entries,
            default_response: default_response.into(),
        }
    }

    /// Responder loaded with the stock onboarding FAQ.
    #[must_use]
    pub fn with_default_knowledge() -> Self {
        Self::new(default_knowledge(), DEFAULT_RESPONSE)
    }

    /// Find the first entry whose keywords occur in `text`.
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<Classification<'_>> {
        let normalized = normalize(text);
        self.entries
            .iter()
            .find(|entry| entry.matches(&normalized))
            .map(|entry| Classification {
                category: &entry.category,
                response: &entry.response,
            })
    }

    /// Category label of `text`, if any entry matches.
    #[must_use]
    pub fn category_of(&self, text: &str) -> Option<&str> {
        self.classify(text).map(|c| c.category)
    }

    /// The reply to show for `text`: the matched response or the default one.
    #[must_use]
    pub fn reply(&self, text: &str) -> &str {
        self.classify(text)
            .map_or(self.default_response.as_str(), |c| c.response)
    }

    #[must_use]
    pub fn default_response(&self) -> &str {
        &self.default_response
    }

    /// Append a rule. New rules rank below every existing one.
    pub fn add_entry<K, S>(&mut self, keywords: K, response: impl Into<String>, category: impl Into<String>)
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push(KnowledgeEntry::new(keywords, category, response));
    }

    /// Distinct categories in declaration order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !out.contains(&entry.category.as_str()) {
                out.push(&entry.category);
            }
        }
        out
    }

    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self::with_default_knowledge()
    }
}

/// Lowercase, turn `. , ! ? ; :` into spaces and collapse whitespace.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if matches!(c, '.' | ',' | '!' | '?' | ';' | ':') { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub const DEFAULT_RESPONSE: &str = "Obrigado pela sua dúvida! Nossa equipe vai analisar e responder em breve. Enquanto isso, você pode consultar o manual do funcionário na intranet ou entrar em contato com seu gestor.";

/// The stock FAQ. Order matters: earlier entries win ties.
#[must_use]
pub fn default_knowledge() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            ["acesso", "sistema", "login", "senha", "credencial", "entrar"],
            "Acesso e Credenciais",
            "Para configurar seu acesso ao sistema, entre em contato com o suporte de TI através do email suporte@empresa.com ou pelo telefone interno 1234. Eles vão te ajudar a configurar suas credenciais.",
        ),
        KnowledgeEntry::new(
            ["email", "outlook", "correio", "mensagem"],
            "Email",
            "Para configurar seu email corporativo, você pode usar o Outlook. Se precisar de ajuda, entre em contato com o suporte de TI ou consulte o guia de configuração na intranet.",
        ),
        KnowledgeEntry::new(
            ["reunião", "meeting", "agendar", "horário", "calendário"],
            "Reuniões",
            "Para agendar reuniões, use o Outlook Calendar. Você pode ver os horários disponíveis dos seus colegas e agendar reuniões diretamente pelo calendário.",
        ),
        KnowledgeEntry::new(
            ["feriado", "férias", "ausência", "licença", "folga"],
            "Férias e Licenças",
            "Para solicitar férias ou licenças, acesse o sistema de RH através da intranet ou entre em contato com o departamento de Recursos Humanos.",
        ),
        KnowledgeEntry::new(
            ["benefício", "vale", "plano", "saúde", "seguro"],
            "Benefícios",
            "Informações sobre benefícios podem ser encontradas no portal do RH ou entrando em contato diretamente com o departamento de Recursos Humanos.",
        ),
        KnowledgeEntry::new(
            ["salário", "pagamento", "holerite", "contracheque"],
            "Pagamento",
            "Informações sobre pagamento e holerites estão disponíveis no portal do RH. Para dúvidas específicas, entre em contato com o departamento financeiro.",
        ),
        KnowledgeEntry::new(
            ["equipe", "colegas", "pessoas", "quem", "contato"],
            "Equipe",
            "Você pode encontrar informações sobre seus colegas no diretório da empresa ou no Teams. Se precisar de contatos específicos, pergunte ao seu gestor.",
        ),
        KnowledgeEntry::new(
            ["documento", "arquivo", "onde", "encontrar", "localizar"],
            "Documentos",
            "A maioria dos documentos da empresa estão armazenados no SharePoint. Você pode acessar através da intranet ou perguntar ao seu gestor sobre a localização de documentos específicos.",
        ),
        KnowledgeEntry::new(
            ["treinamento", "curso", "capacitação", "aprender"],
            "Treinamento",
            "Existem vários treinamentos disponíveis. Consulte o portal de treinamentos na intranet ou fale com seu gestor sobre as capacitações recomendadas para sua função.",
        ),
        KnowledgeEntry::new(
            ["wi-fi", "internet", "rede", "conexão", "wifi"],
            "Tecnologia",
            "Para configurar o Wi-Fi, procure o suporte de TI. As credenciais de rede geralmente são fornecidas no primeiro dia. Se tiver problemas de conexão, entre em contato com o suporte.",
        ),
        KnowledgeEntry::new(
            ["escritório", "local", "endereço", "onde", "ficar"],
            "Localização",
            "Informações sobre localização do escritório e como chegar estão disponíveis na intranet. Se precisar de direções específicas, entre em contato com a recepção.",
        ),
        KnowledgeEntry::new(
            ["horário", "expediente", "entrada", "saída", "jornada"],
            "Horários",
            "O horário de trabalho padrão é das 9h às 18h, com 1 hora de almoço. Horários flexíveis podem ser acordados com seu gestor. Consulte o manual do funcionário para mais detalhes.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_spaces() {
        assert_eq!(normalize("  Olá!!  Tudo bem?  Sim;ok: "), "olá tudo bem sim ok");
        assert_eq!(normalize("Wi-Fi."), "wi-fi");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn classifies_password_question_as_access() {
        let responder = KeywordResponder::with_default_knowledge();
        let hit = responder
            .classify("Preciso de ajuda com minha senha")
            .expect("should match");
        assert_eq!(hit.category, "Acesso e Credenciais");
        assert!(hit.response.contains("suporte de TI"));
    }

    #[test]
    fn unrelated_text_has_no_match() {
        let responder = KeywordResponder::with_default_knowledge();
        assert!(responder.classify("xyz completely unrelated").is_none());
        assert_eq!(
            responder.reply("xyz completely unrelated"),
            responder.default_response()
        );
    }

    #[test]
    fn first_declared_entry_wins_over_keyword_count() {
        // "horário" is listed under Reuniões before Horários, even though
        // "entrada" and "saída" only belong to Horários.
        let responder = KeywordResponder::with_default_knowledge();
        let hit = responder
            .classify("Qual o horário de entrada e saída?")
            .unwrap();
        assert_eq!(hit.category, "Reuniões");
    }

    #[test]
    fn matching_is_case_insensitive_and_ignores_punctuation() {
        let responder = KeywordResponder::with_default_knowledge();
        assert_eq!(responder.category_of("OUTLOOK?!"), Some("Email"));
        assert_eq!(responder.category_of("Como uso o WIFI, afinal"), Some("Tecnologia"));
    }

    #[test]
    fn added_entries_rank_last() {
        let mut responder = KeywordResponder::new(Vec::new(), "default");
        responder.add_entry(["crachá"], "Retire na recepção.", "Acesso Físico");
        responder.add_entry(["crachá", "estacionamento"], "Fale com a portaria.", "Portaria");
        assert_eq!(responder.category_of("meu crachá"), Some("Acesso Físico"));
        assert_eq!(responder.category_of("estacionamento"), Some("Portaria"));
        assert_eq!(responder.reply("nada"), "default");
    }

    #[test]
    fn keywords_are_lowercased_before_matching() {
        let mut responder = KeywordResponder::new(Vec::new(), "default");
        responder.add_entry(["VPN"], "Use o cliente da empresa.", "Tecnologia");
        assert_eq!(responder.category_of("a vpn caiu"), Some("Tecnologia"));
    }

    #[test]
    fn categories_are_distinct_and_ordered() {
        let mut responder = KeywordResponder::with_default_knowledge();
        responder.add_entry(["vpn"], "Use o cliente da empresa.", "Tecnologia");
        let categories = responder.categories();
        assert_eq!(categories.len(), 12);
        assert_eq!(categories[0], "Acesso e Credenciais");
        assert_eq!(categories[11], "Horários");
    }
}
