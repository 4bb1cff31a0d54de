//! Interface de linha de comando do pebble baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (sop, image, nodes)
//! e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::node::{AspectRatio, ImageSize};

/// pebble: gerador de SOPs e nó de geração de imagens Gemini.
#[derive(Debug, Parser)]
#[command(name = "pebble", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./pebble.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gera um documento SOP a partir do template completo ou mínimo (MVP).
    Sop(SopArgs),

    /// Gera uma imagem com o nó Gemini a partir de um prompt e imagens PNG.
    Image(ImageArgs),

    /// Lista os nós registrados, em JSON.
    Nodes {
        /// Mostra apenas o nó com este `class_type`.
        class_type: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SopArgs {
    /// Título do SOP.
    #[arg(long)]
    pub title: String,

    /// Número do documento (padrão: SOP-000).
    #[arg(long)]
    pub doc_id: Option<String>,

    /// Versão do documento (padrão: v1.0).
    #[arg(long = "version")]
    pub doc_version: Option<String>,

    /// Data de publicação (padrão: hoje, AAAA-MM-DD).
    #[arg(long)]
    pub date: Option<String>,

    /// Responsável pela elaboração (padrão: Unassigned).
    #[arg(long)]
    pub owner: Option<String>,

    /// Revisor (padrão: Unassigned).
    #[arg(long)]
    pub reviewer: Option<String>,

    /// Aprovador (padrão: Unassigned).
    #[arg(long)]
    pub approver: Option<String>,

    /// Usa o template mínimo viável (MVP).
    #[arg(long, default_value_t = false)]
    pub mvp: bool,

    /// Caminho de saída; '-' escreve na saída padrão.
    #[arg(long, short, default_value = "-")]
    pub output: String,

    /// Diretório com os templates (sobrepõe `templates_dir` da configuração).
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Prompt de texto enviado ao modelo.
    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Imagem PNG de entrada (até 14; repita a flag).
    #[arg(long = "image", value_name = "PNG")]
    pub images: Vec<PathBuf>,

    /// Resolução da imagem gerada: 1K, 2K ou 4K.
    #[arg(long, default_value_t = ImageSize::default())]
    pub image_size: ImageSize,

    /// Proporção da imagem (AUTO, 1:1, 16:9, ...).
    #[arg(long, default_value_t = AspectRatio::default())]
    pub aspect_ratio: AspectRatio,

    /// Limite de tempo por tentativa, em segundos (10–600).
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Número máximo de tentativas (1–20).
    #[arg(long)]
    pub retry_times: Option<u32>,

    /// Chave da API (sobrepõe GEMINI_API_KEY e o arquivo de configuração).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Caminho do PNG gerado.
    #[arg(long, short)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_sop_with_defaults() {
        let cli = Cli::parse_from(["pebble", "sop", "--title", "Deploy"]);
        match cli.command {
            Command::Sop(args) => {
                assert_eq!(args.title, "Deploy");
                assert!(args.doc_id.is_none());
                assert!(args.doc_version.is_none());
                assert!(args.owner.is_none());
                assert_eq!(args.output, "-");
                assert!(args.date.is_none());
                assert!(!args.mvp);
            }
            _ => panic!("expected Sop command"),
        }
    }

    #[test]
    fn cli_parses_sop_version_and_mvp() {
        let cli = Cli::parse_from([
            "pebble", "sop", "--title", "Deploy", "--version", "v3.0", "--mvp", "--output", "out.md",
        ]);
        match cli.command {
            Command::Sop(args) => {
                assert_eq!(args.doc_version.as_deref(), Some("v3.0"));
                assert!(args.mvp);
                assert_eq!(args.output, "out.md");
            }
            _ => panic!("expected Sop command"),
        }
    }

    #[test]
    fn cli_parses_image_subcommand() {
        let cli = Cli::parse_from([
            "pebble",
            "--verbose",
            "image",
            "--prompt",
            "a fox",
            "--image",
            "a.png",
            "--image",
            "b.png",
            "--image-size",
            "2k",
            "--aspect-ratio",
            "16:9",
            "--retry-times",
            "3",
            "-o",
            "fox.png",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Image(args) => {
                assert_eq!(args.prompt, "a fox");
                assert_eq!(args.images, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
                assert_eq!(args.image_size, ImageSize::TwoK);
                assert_eq!(args.aspect_ratio, AspectRatio::Ratio(16, 9));
                assert_eq!(args.retry_times, Some(3));
                assert!(args.timeout_seconds.is_none());
                assert_eq!(args.output, PathBuf::from("fox.png"));
            }
            _ => panic!("expected Image command"),
        }
    }

    #[test]
    fn cli_rejects_unsupported_aspect_ratio() {
        let result = Cli::try_parse_from(["pebble", "image", "--aspect-ratio", "7:3", "-o", "x.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_nodes_filter() {
        let cli = Cli::parse_from(["pebble", "nodes", "Gemini3ImageNode"]);
        match cli.command {
            Command::Nodes { class_type } => assert_eq!(class_type.as_deref(), Some("Gemini3ImageNode")),
            _ => panic!("expected Nodes command"),
        }
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
