// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para processamento de texto:
// - Truncation e estimativa de tokens
// - Normalização de manchetes
// - Similaridade entre conjuntos de tokens
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeSet;

/// Estimativa de tokens por caractere (GPT-4)
const CHARS_PER_TOKEN: f32 = 4.0;

/// Estima número de tokens em um texto
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() as f32 / CHARS_PER_TOKEN).ceil() as usize
}

/// Trunca texto para um número máximo de tokens
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> &str {
    let max_chars = (max_tokens as f32 * CHARS_PER_TOKEN) as usize;
    if text.len() <= max_chars {
        text
    } else {
        // Encontra boundary de caractere válido
        let mut end = max_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

/// Remove caracteres de controle e normaliza whitespace
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extrai primeira sentença de um texto
pub fn first_sentence(text: &str) -> &str {
    let terminators = ['.', '!', '?'];
    for (i, c) in text.char_indices() {
        if terminators.contains(&c) {
            // Verifica se não é abreviação (ex: "Dr.", "U.S.")
            let remaining = &text[i + c.len_utf8()..];
            if remaining.starts_with(char::is_whitespace) || remaining.is_empty() {
                return &text[..=i];
            }
        }
    }
    text
}

/// Conta palavras em um texto
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Verifica se é uma stopword comum
pub fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
        "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
        "this", "that", "these", "those", "what", "which", "who", "whom", "when", "where", "why",
        "how", "all", "each", "every", "both", "few", "more", "most", "other", "some", "such",
        "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just", "also",
        "it", "its", "into", "over", "after", "about", "up", "out", "new", "says", "said",
    ];

    STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// Normaliza manchete: minúsculas, sem pontuação, whitespace único.
///
/// Apóstrofos são removidos ("What's" -> "whats"); demais pontuações
/// viram espaço ("Apple-OpenAI" -> "apple openai").
pub fn normalize_headline(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tokens significativos de um texto (sem stopwords e sem tokens de 1 char)
pub fn content_tokens(text: &str) -> BTreeSet<String> {
    normalize_headline(text)
        .split_whitespace()
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Índice de Jaccard: |A ∩ B| / |A ∪ B| (0.0 se ambos vazios)
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Coeficiente de sobreposição: |A ∩ B| / min(|A|, |B|)
pub fn overlap_coefficient(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / smaller as f32
}

/// Verifica se `fragment` (com mais de `max_words` palavras) aparece literalmente em `source`
pub fn is_verbatim_copy(fragment: &str, source: &str, max_words: usize) -> bool {
    let fragment = normalize_headline(fragment);
    if word_count(&fragment) <= max_words {
        return false;
    }
    normalize_headline(source).contains(&fragment)
}
