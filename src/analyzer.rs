//! Rule-based code review for the playground ("analyze my code").
//!
//! Rules are plain predicates over the source text. General rules run for every
//! language, then the language's own table; `jsx` also runs the javascript table.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const MAX_SCORE: u32 = 100;
const PENALTY_PER_SUGGESTION: u32 = 8;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
    pub example: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub language: String,
    pub score: u32,
    pub suggestions: Vec<Suggestion>,
    pub best_practices: Vec<&'static str>,
}

struct Rule {
    kind: &'static str,
    message: &'static str,
    example: &'static str,
    test: fn(&str) -> bool,
}

impl Rule {
    fn suggestion(&self) -> Suggestion {
        Suggestion { kind: self.kind, message: self.message, example: self.example }
    }
}

static TODO_COMMENT: OnceLock<Option<Regex>> = OnceLock::new();
static CHAINED_THEN: OnceLock<Option<Regex>> = OnceLock::new();
static BARE_EXCEPT: OnceLock<Option<Regex>> = OnceLock::new();
static NAMED_EXCEPT: OnceLock<Option<Regex>> = OnceLock::new();

fn is_match(slot: &'static OnceLock<Option<Regex>>, pattern: &str, code: &str) -> bool {
    slot.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .map(|re| re.is_match(code))
        .unwrap_or(false)
}

const GENERAL_RULES: &[Rule] = &[
    Rule {
        kind: "debug",
        message: "Pensez à supprimer les console.log avant la mise en production",
        example: "// Supprimez ou commentez: console.log(...)",
        test: |code| code.contains("console.log"),
    },
    Rule {
        kind: "organization",
        message: "Des TODO sont présents dans le code",
        example: "// Complétez les TODO avant la finalisation",
        test: |code| is_match(&TODO_COMMENT, r"//\s*TODO", code),
    },
];

const JAVASCRIPT_RULES: &[Rule] = &[
    Rule {
        kind: "modern",
        message: "Préférez const et let à var pour une meilleure gestion de la portée",
        example: "const x = 1; // pour les valeurs immuables\nlet y = 2; // pour les variables",
        test: |code| code.contains("var "),
    },
    Rule {
        kind: "style",
        message: "Considérez utiliser des fonctions fléchées pour plus de concision",
        example: "const add = (a, b) => a + b;",
        test: |code| code.contains("function(") && !code.contains("=>"),
    },
    Rule {
        kind: "modern",
        message: "Envisagez d'utiliser async/await pour une meilleure lisibilité",
        example: "async function getData() {\n  const result = await fetch(url);\n  return await result.json();\n}",
        test: |code| is_match(&CHAINED_THEN, r"\.then\(.*\.then\(", code),
    },
];

const JSX_RULES: &[Rule] = &[
    Rule {
        kind: "optimization",
        message: "L'import de React n'est pas nécessaire si vous n'utilisez pas directement React.*",
        example: "// Supprimez si inutilisé:\n// import React from 'react';",
        test: |code| code.contains("import React from 'react';") && !code.contains("React."),
    },
    Rule {
        kind: "bestpractice",
        message: "Ajoutez un attribut \"key\" unique lors de la génération de listes avec map()",
        example: "{items.map((item) => <div key={item.id}>{item.name}</div>)}",
        test: |code| (code.contains(".map(") || code.contains(".forEach(")) && !code.contains("key="),
    },
    Rule {
        kind: "nextjs",
        message: "Ajoutez la directive \"use client\" en haut du fichier pour les composants utilisant des hooks React",
        example: "\"use client\";\n\nimport { useState } from \"react\";",
        test: |code| code.contains("useState(") && !code.contains("use client"),
    },
];

const CSS_RULES: &[Rule] = &[Rule {
    kind: "style",
    message: "Évitez d'utiliser !important, préférez une spécificité CSS plus élevée",
    example: ".sidebar .button { /* plus spécifique que juste .button */ }",
    test: |code| code.contains("!important"),
}];

const PYTHON_RULES: &[Rule] = &[Rule {
    kind: "bestpractice",
    message: "Évitez les blocs except génériques, spécifiez les exceptions à capturer",
    example: "try:\n    data = process_data()\nexcept ValueError as e:\n    print(f\"Erreur de valeur: {e}\")",
    test: |code| is_match(&BARE_EXCEPT, r"except:", code) && !is_match(&NAMED_EXCEPT, r"except \w+:", code),
}];

const JAVASCRIPT_PRACTICES: &[&str] = &[
    "Utilisez des noms de variables descriptifs",
    "Préférez const lorsque les variables ne changent pas",
    "Utilisez les fonctions fléchées pour les callbacks",
    "Découpez les fonctions complexes en fonctions plus petites",
    "Commentez votre code pour expliquer le \"pourquoi\", pas le \"comment\"",
];

const JSX_PRACTICES: &[&str] = &[
    "Découpez l'interface en petits composants réutilisables",
    "Utilisez les hooks React pour une meilleure organisation du code",
    "Évitez les rendus inutiles avec useMemo et useCallback",
    "Préférez les composants fonctionnels aux composants de classe",
    "Gardez l'état au niveau le plus bas possible dans l'arborescence des composants",
];

const PYTHON_PRACTICES: &[&str] = &[
    "Suivez les conventions PEP 8 pour la lisibilité",
    "Utilisez des noms de variables en snake_case",
    "Préférez les list comprehensions aux boucles for simples",
    "Utilisez les docstrings pour documenter les fonctions et classes",
    "Gérez les exceptions de manière spécifique",
];

fn rule_tables(language: &str) -> Vec<&'static [Rule]> {
    match language {
        "javascript" => vec![GENERAL_RULES, JAVASCRIPT_RULES],
        "jsx" => vec![GENERAL_RULES, JSX_RULES, JAVASCRIPT_RULES],
        "css" => vec![GENERAL_RULES, CSS_RULES],
        "python" => vec![GENERAL_RULES, PYTHON_RULES],
        _ => vec![GENERAL_RULES],
    }
}

fn best_practices(language: &str) -> &'static [&'static str] {
    match language {
        "jsx" => JSX_PRACTICES,
        "python" => PYTHON_PRACTICES,
        _ => JAVASCRIPT_PRACTICES,
    }
}

/// Analyse `code`. `language` defaults to javascript; the score counts every
/// triggered rule, the returned list keeps the first five.
pub fn analyze(code: &str, language: Option<&str>) -> Analysis {
    let language = language
        .map(|l| l.trim().to_ascii_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "javascript".to_string());

    let mut suggestions: Vec<Suggestion> = rule_tables(&language)
        .into_iter()
        .flat_map(|table| table.iter())
        .filter(|rule| (rule.test)(code))
        .map(Rule::suggestion)
        .collect();

    let penalty = PENALTY_PER_SUGGESTION.saturating_mul(suggestions.len() as u32);
    let score = MAX_SCORE.saturating_sub(penalty);
    suggestions.truncate(MAX_SUGGESTIONS);

    Analysis { best_practices: best_practices(&language).to_vec(), language, score, suggestions }
}
