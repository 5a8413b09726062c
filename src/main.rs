// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// NEWS SENSE CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI fina sobre o controller.
//
// Uso:
//   news-sense-cli "What's trending in tech today?"
//   news-sense-cli --topics tech,politics --json "Did Apple acquire OpenAI?"
//   news-sense-cli --rules "Summarize this article: ..."
//   news-sense-cli --demo
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use news_sense::llm::OpenAiClient;
use news_sense::news::GNewsClient;
use news_sense::prelude::*;
use news_sense::search::GoogleSearchClient;
use std::path::PathBuf;
use std::sync::Arc;

/// Queries executadas por `--demo`
const DEMO_QUERIES: [&str; 3] = [
    "What's trending in tech today?",
    "Did Apple acquire OpenAI?",
    "Summarize this article: OpenAI expands GPT access to new platforms",
];

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!("✓ Carregado .env de: {:?}", path);
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    if dotenvy::dotenv().is_err() {
        eprintln!("⚠ Nenhum arquivo .env encontrado. Certifique-se de que API_KEY, GNEWS_API_KEY, GOOGLE_API_KEY e SEARCH_ENGINE_ID estão definidas.");
    }
}

/// Argumentos da linha de comando
#[derive(Debug, Default)]
struct CliArgs {
    topics: Vec<String>,
    json: bool,
    rules: bool,
    demo: bool,
    query: String,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut words = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--rules" => parsed.rules = true,
            "--demo" => parsed.demo = true,
            "--topics" => {
                let value = iter.next().context("--topics precisa de uma lista (ex: tech,politics)")?;
                parsed.topics = value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            _ => words.push(arg.clone()),
        }
    }

    parsed.query = words.join(" ");
    Ok(parsed)
}

fn print_usage(program: &str) {
    eprintln!("NewsSense CLI v{}", news_sense::VERSION);
    eprintln!();
    eprintln!("Uso: {} [opções] <query>", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  --topics <a,b>   Tópicos preferidos do usuário");
    eprintln!("  --json           Imprime a resposta em JSON");
    eprintln!("  --rules          Usa o classificador por regras");
    eprintln!("  --demo           Executa as queries de demonstração");
    eprintln!();
    eprintln!("Exemplos:");
    eprintln!("  {} \"What's trending in tech today?\"", program);
    eprintln!("  {} --json \"Is it true that Apple acquired OpenAI?\"", program);
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    news_sense::install_panic_hook();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "news-sense-cli".into());
    let cli = parse_args(args.get(1..).unwrap_or_default())?;

    if cli.query.is_empty() && !cli.demo {
        print_usage(&program);
        std::process::exit(1);
    }

    let runtime = news_sense::create_tokio_runtime(&news_sense::load_runtime_config())
        .context("falha ao criar runtime Tokio")?;
    runtime.block_on(run(cli))
}

async fn run(cli: CliArgs) -> anyhow::Result<()> {
    let mut core = news_sense::load_core_config();
    if cli.rules {
        core.classifier = ClassifierPreference::Rules;
    }

    let providers = news_sense::load_provider_config().context(
        "credenciais ausentes: defina API_KEY, GNEWS_API_KEY, GOOGLE_API_KEY e SEARCH_ENGINE_ID",
    )?;

    let llm: Arc<dyn LlmClient> = Arc::new(
        OpenAiClient::new(providers.llm_api_key.clone())
            .with_base_url(&providers.llm_base_url)
            .with_model(&providers.llm_model)
            .with_timeout(core.provider_timeout),
    );
    let news: Arc<dyn NewsSearchClient> = Arc::new(
        GNewsClient::new(providers.gnews_api_key.clone()).with_timeout(core.provider_timeout),
    );
    let web: Arc<dyn WebSearchClient> = Arc::new(
        GoogleSearchClient::new(
            providers.google_api_key.clone(),
            providers.search_engine_id.clone(),
        )
        .with_timeout(core.provider_timeout),
    );

    let controller = NewsSenseController::from_providers(llm, news, web, core);

    let topics = if cli.topics.is_empty() && cli.demo {
        vec!["tech".to_string(), "politics".to_string()]
    } else {
        cli.topics.clone()
    };
    let context = UserContext::new("news_user_001").with_topics(topics);

    let queries: Vec<String> = if cli.demo {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        vec![cli.query.clone()]
    };

    for query in &queries {
        if !cli.json {
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!(" {}", query);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        }

        match controller.handle_query(query, Some(&context)).await {
            Ok(response) if cli.json => {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Ok(response) => render(&response),
            Err(e) => {
                log::error!("❌ {}", e);
                println!("✗ {}", e.user_message());
            }
        }
        println!();
    }

    Ok(())
}

/// Imprime a resposta em texto
fn render(response: &QueryResponse) {
    match &response.outcome {
        QueryOutcome::Trending(items) => {
            if items.is_empty() {
                println!("Nenhuma notícia encontrada.");
            }
            for item in items {
                println!(
                    "{}. {} [{}] ({} fonte{})",
                    item.rank,
                    item.headline,
                    item.sources.join(", "),
                    item.frequency,
                    if item.frequency == 1 { "" } else { "s" }
                );
                if !item.description.is_empty() {
                    println!("   {}", item.description);
                }
            }
        }
        QueryOutcome::FactCheck(result) => {
            println!("Afirmação: {}", result.claim);
            println!("Veredito:  {}", result.verdict);
            println!("Motivo:    {}", result.rationale);
            if !result.references.is_empty() {
                println!("Fontes:");
                for (i, reference) in result.references.iter().enumerate() {
                    println!("  {}. {} - {}", i + 1, reference.title, reference.url);
                }
            }
        }
        QueryOutcome::Summary(summary) => {
            println!("{}", summary.topic);
            for bullet in &summary.bullets {
                println!("  • {}", bullet);
            }
            if summary.degraded {
                println!("  (resumo incompleto)");
            }
        }
        QueryOutcome::Clarification(request) => {
            println!("{}", request.message);
            for suggestion in &request.suggestions {
                println!("  - {}", suggestion);
            }
        }
    }
    println!();
    println!("⏱️  {} em {}ms", response.intent, response.elapsed_ms);
}
