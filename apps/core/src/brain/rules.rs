//! Static TCC rule table.
//!
//! Ordered keyword rules mapping free text to CBT categories. The table order is
//! the tie-break policy: the first matching rule drives the response template.
//! Triggers are lowercase and matched against case-folded input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CBT category assigned to a client utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Anxiety,
    Depression,
    WorkStress,
    Relationships,
    Overwhelm,
    Anger,
    /// Fallback when no rule matched
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Anxiety => "anxiety",
            Category::Depression => "depression",
            Category::WorkStress => "work_stress",
            Category::Relationships => "relationships",
            Category::Overwhelm => "overwhelm",
            Category::Anger => "anger",
            Category::General => "general",
        }
    }

    /// Rule entry for this category, `None` for `General`
    pub fn rule(&self) -> Option<&'static CategoryRule> {
        RULES.iter().find(|r| r.category == *self)
    }

    /// Homework templates for this category
    pub fn homework(&self) -> &'static [&'static str] {
        match self.rule() {
            Some(rule) => rule.homework,
            None => GENERAL_HOMEWORK,
        }
    }
}

/// One entry of the rule table
#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    pub triggers: &'static [&'static str],
    pub emotional_indicator: &'static str,
    pub cognitive_patterns: &'static [&'static str],
    pub behavioral_concerns: &'static [&'static str],
    pub techniques: &'static [&'static str],
    pub homework: &'static [&'static str],
}

pub const RESTRUCTURING_TECHNIQUE: &str = "Reestruturação cognitiva";

pub static RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Anxiety,
        triggers: &[
            "ansios",
            "ansiedade",
            "preocupad",
            "nervos",
            "tenso",
            "tensa",
            "medo",
            "pânico",
            "panico",
            "angústia",
            "apreensiv",
        ],
        emotional_indicator: "ansiedade",
        cognitive_patterns: &["Catastrofização", "Adivinhação do futuro"],
        behavioral_concerns: &["Evitação de situações temidas"],
        techniques: &["Técnicas de relaxamento", "Exposição gradual", "Mindfulness"],
        homework: &[
            "Pratique 5 minutos de respiração consciente por dia. Foque na respiração e observe seus pensamentos sem julgamento.",
            "Crie uma lista de situações que você evita, ordenadas por nível de ansiedade. Comece enfrentando a situação menos ansiosa.",
            "Quando a ansiedade surgir, anote o pensamento e avalie de 0 a 100 o quanto acredita nele, antes e depois de buscar evidências.",
        ],
    },
    CategoryRule {
        category: Category::Depression,
        triggers: &[
            "triste",
            "tristeza",
            "desanimad",
            "sem esperança",
            "vazio",
            "vazia",
            "culpa",
            "deprimid",
            "depressão",
            "sem vontade",
            "sem energia",
        ],
        emotional_indicator: "depressão",
        cognitive_patterns: &["Filtro mental negativo", "Desqualificação do positivo"],
        behavioral_concerns: &["Isolamento e redução de atividades"],
        techniques: &[
            "Ativação comportamental",
            RESTRUCTURING_TECHNIQUE,
            "Planejamento de atividades",
        ],
        homework: &[
            "Planeje uma atividade prazerosa para cada dia da próxima semana. Registre como se sentiu antes e depois de cada atividade.",
            "Registre seus pensamentos automáticos em um diário por uma semana. Para cada pensamento negativo, pergunte-se: 'Que evidências tenho para isso?'",
        ],
    },
    CategoryRule {
        category: Category::WorkStress,
        triggers: &[
            "trabalho",
            "chefe",
            "emprego",
            "pressão",
            "pression",
            "prazo",
            "reunião",
            "reuniões",
            "carreira",
            "demissão",
            "escritório",
            "burnout",
        ],
        emotional_indicator: "estresse",
        cognitive_patterns: &["Afirmações do tipo 'deveria'", "Personalização"],
        behavioral_concerns: &["Dificuldade em estabelecer limites"],
        techniques: &[
            "Estabelecimento de limites",
            "Priorização de tarefas",
            "Resolução de problemas",
        ],
        homework: &[
            "Liste suas tarefas de trabalho e classifique-as por urgência e importância. Escolha no máximo três prioridades por dia.",
            "Defina um horário fixo para encerrar o expediente e observe como se sente ao respeitar esse limite durante a semana.",
        ],
    },
    CategoryRule {
        category: Category::Relationships,
        triggers: &[
            "relacionamento",
            "pessoas",
            "amigos",
            "amizade",
            "namorad",
            "família",
            "sozinh",
            "solidão",
            "isolad",
            "julgad",
            "rejeição",
            "rejeitad",
            "brigas",
            "briguei",
            "brigamos",
        ],
        emotional_indicator: "desconforto social",
        cognitive_patterns: &["Leitura mental", "Rotulação"],
        behavioral_concerns: &["Retraimento social"],
        techniques: &[
            "Treino de assertividade",
            RESTRUCTURING_TECHNIQUE,
            "Habilidades sociais",
        ],
        homework: &[
            "Escolha uma situação social desta semana e anote o que imaginou que os outros pensavam de você. Depois, liste evidências a favor e contra.",
            "Pratique uma comunicação assertiva por dia: expresse uma necessidade ou opinião de forma clara e respeitosa.",
        ],
    },
    CategoryRule {
        category: Category::Overwhelm,
        triggers: &[
            "sobrecarregad",
            "responsabilidades",
            "correria",
            "estressad",
            "não dou conta",
            "exausto",
            "exausta",
            "cansad",
        ],
        emotional_indicator: "sobrecarga",
        cognitive_patterns: &["Pensamento tudo-ou-nada", "Magnificação"],
        behavioral_concerns: &["Procrastinação por sobrecarga"],
        techniques: &[
            "Priorização de tarefas",
            "Resolução de problemas",
            "Divisão de tarefas em passos menores",
        ],
        homework: &[
            "Faça uma lista de todas as responsabilidades e quebre a mais urgente em passos pequenos que caibam em 15 minutos.",
            "Pratique dizer 'não' a um pedido que não seja prioritário nesta semana e registre como foi.",
        ],
    },
    CategoryRule {
        category: Category::Anger,
        triggers: &[
            "irritad",
            "furios",
            "revoltad",
            "frustrad",
            "raiva",
            "odeio",
        ],
        emotional_indicator: "raiva",
        cognitive_patterns: &["Raciocínio emocional", "Culpabilização"],
        behavioral_concerns: &["Reações impulsivas"],
        techniques: &[
            "Identificação de gatilhos",
            "Pausa antes de reagir",
            "Técnicas de relaxamento",
        ],
        homework: &[
            "Sempre que sentir raiva, anote o gatilho, o pensamento e a intensidade da emoção de 0 a 10.",
            "Antes de responder em um momento de irritação, faça uma pausa de 10 respirações lentas.",
        ],
    },
];

/// Question prompts suggested when no rule matched
pub static GENERAL_TECHNIQUES: &[&str] = &[
    "Que evidências você tem para esse pensamento?",
    "Existe uma forma alternativa de ver essa situação?",
    "O que você diria a um amigo na mesma situação?",
];

pub static GENERAL_HOMEWORK: &[&str] = &[
    "Reserve alguns minutos por dia para um check-in emocional: identifique e nomeie suas emoções sem julgamento.",
    "Quando notar um pensamento negativo, pergunte-se: 'Isso é um fato ou uma interpretação?' e anote a resposta.",
];

/// Absolutist-thinking markers, independent of category
pub static DISTORTION_TRIGGERS: &[&str] = &[
    "sempre",
    "nunca",
    "todos",
    "ninguém",
    "deveria",
    "tenho que",
    "não consigo",
    "impossível",
    "terrível",
    "catastrófico",
];

pub fn distortion_label(trigger: &str) -> String {
    format!("Pensamento absolutista: '{}'", trigger)
}
