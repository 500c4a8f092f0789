//! Prompt and response templates.

use super::analysis::TccAnalysis;
use super::rules::Category;

/// System prompt sent with every live generation
pub const SYSTEM_PROMPT: &str = "Você é um assistente especializado em Terapia Cognitivo-Comportamental (TCC).

PRINCÍPIOS FUNDAMENTAIS DA TCC:
- Conexão entre pensamentos, sentimentos e comportamentos
- Foco no presente e em soluções práticas
- Colaboração ativa com o cliente
- Uso de técnicas baseadas em evidências
- Objetivos específicos e mensuráveis

TÉCNICAS PRINCIPAIS:
1. Reestruturação Cognitiva: identificar e questionar pensamentos automáticos negativos
2. Ativação Comportamental: aumentar atividades prazerosas e funcionais
3. Exposição: enfrentar gradualmente situações temidas
4. Resolução de Problemas: estratégias sistemáticas para lidar com desafios
5. Mindfulness: atenção plena e aceitação

ESTILO DE COMUNICAÇÃO:
- Empático e acolhedor
- Colaborativo e não-diretivo
- Linguagem clara e acessível
- Perguntas abertas que promovem reflexão

NUNCA:
- Dê conselhos médicos ou diagnósticos
- Substitua terapia profissional
- Minimize a dor emocional";

/// Wrap the client input with the detected TCC context for the model
pub fn build_tcc_prompt(client_input: &str, analysis: &TccAnalysis) -> String {
    format!(
        "CONTEXTO DA SESSÃO:
- Técnicas sugeridas: {}
- Padrões cognitivos identificados: {}
- Indicadores emocionais: {}

ENTRADA DO CLIENTE: {}

INSTRUÇÕES:
1. Responda de forma empática e acolhedora
2. Use técnicas TCC apropriadas
3. Faça perguntas que promovam reflexão
4. Sugira exercícios práticos quando relevante
5. Mantenha foco em soluções e no presente
6. Promova autonomia do cliente
",
        analysis.suggested_techniques.join(", "),
        analysis.cognitive_patterns.join(", "),
        analysis.emotional_indicators.join(", "),
        client_input
    )
}

const ANXIETY_TEMPLATES: &[&str] = &["Entendo que você está se sentindo ansioso(a). É natural sentir essa preocupação, e podemos trabalhar juntos para lidar com ela.

Na Terapia Cognitivo-Comportamental, aprendemos que nossos pensamentos influenciam diretamente nossos sentimentos. Quando pensamos \"vai dar tudo errado\", a ansiedade cresce.

Vamos questionar esse pensamento: que evidências você tem de que o pior vai acontecer? Já passou por situações parecidas antes? O que aconteceu?

Que tal praticarmos uma técnica de relaxamento? Inspire por 4 segundos, segure por 4 segundos e expire por 6 segundos. Repita algumas vezes.

Lembre-se: vamos focar no que está sob o seu controle agora."];

const DEPRESSION_TEMPLATES: &[&str] = &["Vejo que você está passando por um momento difícil. Seus sentimentos são válidos e é importante reconhecê-los.

Na TCC, trabalhamos com a ideia de que podemos aprender a identificar padrões de pensamento que alimentam esses sentimentos.

Que tal começarmos com uma pequena atividade? Mesmo sem vontade, tente fazer algo pequeno e prazeroso hoje: ouvir uma música de que gosta, caminhar um pouco ou ligar para alguém especial.

Você não está sozinho(a) nisso. Pequenos passos podem fazer uma grande diferença."];

const WORK_STRESS_TEMPLATES: &[&str] = &["Entendo que você está passando por dificuldades no trabalho. Isso pode ser muito desafiador, e é importante reconhecer o impacto que tem em você.

Na TCC, podemos identificar padrões de pensamento que contribuem para o estresse no trabalho.

Que situações específicas estão te causando mais preocupação? Como você tem lidado com elas até agora?

Algumas estratégias práticas:
- Identificar quais aspectos do trabalho você pode controlar
- Priorizar tarefas por urgência e importância
- Estabelecer limites claros entre trabalho e vida pessoal

O que você acha que seria mais útil para começar?"];

const RELATIONSHIPS_TEMPLATES: &[&str] = &["Vejo que você está enfrentando desafios nos relacionamentos. Isso pode ser doloroso, e é compreensível que você se sinta assim.

Na TCC, aprendemos que nossos pensamentos sobre situações sociais influenciam como nos sentimos e nos comportamos.

Que pensamentos surgem quando você está com outras pessoas? Você se preocupa com o que pensam de você?

Algumas estratégias que podem ajudar:
- Praticar a comunicação assertiva
- Questionar pensamentos como \"todos vão me julgar\"
- Focar em ser autêntico(a) em vez de tentar agradar a todos

Que tipo de situação social te causa mais desconforto?"];

const OVERWHELM_TEMPLATES: &[&str] = &["Entendo que você está se sentindo sobrecarregado(a) com tantas responsabilidades. É natural se sentir assim quando há muitas coisas para cuidar.

Na TCC, usamos técnicas de resolução de problemas e priorização para situações como essa.

Vamos organizar: quais responsabilidades são mais urgentes? E quais são mais importantes para você?

Algumas estratégias:
- Fazer uma lista de todas as responsabilidades
- Priorizar por urgência e importância
- Quebrar tarefas grandes em passos menores
- Praticar dizer \"não\" quando necessário

Qual responsabilidade está te causando mais estresse neste momento?"];

const ANGER_TEMPLATES: &[&str] = &["Percebo que você está sentindo muita raiva ou frustração. Essas emoções são legítimas e costumam sinalizar que algo importante para você foi afetado.

Na TCC, olhamos para a sequência entre a situação, o pensamento e a reação. Muitas vezes é o pensamento sobre o que aconteceu que intensifica a raiva.

O que aconteceu logo antes de você se sentir assim? Que pensamento passou pela sua cabeça naquele momento?

Quando a raiva subir, experimente fazer uma pausa: afaste-se por alguns minutos e respire devagar antes de responder.

Como você gostaria de reagir da próxima vez em uma situação parecida?"];

/// Fallback templates; the first one is used in demo mode
pub const GENERAL_TEMPLATES: &[&str] = &[
    "Obrigado por compartilhar isso comigo. Na Terapia Cognitivo-Comportamental, valorizamos muito a colaboração e o trabalho conjunto.

Vamos explorar sua situação juntos. O que você acha que poderia ajudar neste momento? Que estratégias você já usou antes que funcionaram?

Na TCC, focamos no presente e em soluções práticas. Que pequeno passo você poderia dar hoje para se sentir melhor?",
    "Entendo que você está passando por um momento desafiador. Buscar ajuda é um sinal de força, não de fraqueza.

Na TCC, aprendemos a identificar e modificar padrões de pensamento que não estão nos servindo bem.

Como você tem interpretado essa situação? Que pensamentos passam pela sua cabeça quando pensa nisso?

Uma técnica simples: quando notar um pensamento negativo, pergunte-se \"isso é um fato ou uma interpretação?\"",
    "Seus sentimentos são válidos e é importante dar espaço para eles.

Na TCC, aprendemos que pensamentos, sentimentos e comportamentos estão conectados. Quando mudamos um, influenciamos os outros.

Que emoções você está sentindo com mais intensidade? E que comportamentos tem notado em si mesmo(a)?

Experimente um \"check-in emocional\": reserve alguns minutos por dia para identificar e nomear suas emoções sem julgamento.",
];

pub fn templates_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Anxiety => ANXIETY_TEMPLATES,
        Category::Depression => DEPRESSION_TEMPLATES,
        Category::WorkStress => WORK_STRESS_TEMPLATES,
        Category::Relationships => RELATIONSHIPS_TEMPLATES,
        Category::Overwhelm => OVERWHELM_TEMPLATES,
        Category::Anger => ANGER_TEMPLATES,
        Category::General => GENERAL_TEMPLATES,
    }
}

/// Canned demo-mode response for a category
pub fn response_template(category: Category) -> &'static str {
    templates_for(category)
        .first()
        .copied()
        .unwrap_or(GENERAL_TEMPLATES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_template() {
        for category in [
            Category::Anxiety,
            Category::Depression,
            Category::WorkStress,
            Category::Relationships,
            Category::Overwhelm,
            Category::Anger,
            Category::General,
        ] {
            assert!(!response_template(category).trim().is_empty(), "{}", category);
        }
    }

    #[test]
    fn test_general_uses_first_template() {
        assert_eq!(response_template(Category::General), GENERAL_TEMPLATES[0]);
    }

    #[test]
    fn test_build_tcc_prompt() {
        let analysis = TccAnalysis {
            suggested_techniques: vec![
                "Mindfulness".to_string(),
                "Exposição gradual".to_string(),
            ],
            emotional_indicators: vec!["ansiedade".to_string()],
            ..Default::default()
        };

        let prompt = build_tcc_prompt("Estou nervoso", &analysis);
        assert!(prompt.contains("Técnicas sugeridas: Mindfulness, Exposição gradual"));
        assert!(prompt.contains("Indicadores emocionais: ansiedade"));
        assert!(prompt.contains("ENTRADA DO CLIENTE: Estou nervoso"));
    }
}
