//! Saída de terminal do comando `image`.
//!
//! O [`GenerationProgress`] mostra um spinner (`indicatif`) enquanto as
//! tentativas rodam e imprime cada retentativa acima dele, colorida com
//! `console`.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::PebbleError;
use crate::node::{NodeError, NodeOutput};
use crate::retry::AttemptOutcome;

/// Indicador visual de progresso para uma geração de imagem no terminal.
///
/// Exibe um spinner animado durante as tentativas e mensagens
/// coloridas para sucesso (verde) e retentativas/timeouts (amarelo).
pub struct GenerationProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo amarelo para mensagens de retentativa.
    yellow: Style,
}

impl GenerationProgress {
    /// Inicia o spinner com a descrição da geração e retorna a instância de progresso.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("Generating: {}", truncate(description, 60)));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Registra o resultado de uma tentativa; timeouts e falhas transitórias
    /// viram uma linha de retentativa acima do spinner.
    pub fn attempt<T, E: Display>(&self, attempt: u32, max: u32, outcome: &AttemptOutcome<T, E>) {
        if outcome.is_success() {
            self.pb.set_message("Decoding response");
            return;
        }
        let line = match outcome {
            AttemptOutcome::Timeout { after } => {
                format!("Attempt {attempt}/{max} timed out after {}s", after.as_secs())
            }
            AttemptOutcome::RetryableFailure(err) => format!("Attempt {attempt}/{max} failed: {err}"),
            AttemptOutcome::Success(_) | AttemptOutcome::FatalFailure(_) => return,
        };
        self.pb.println(format!("  {} {line}", self.yellow.apply_to("↻")));
        if attempt < max {
            self.pb.set_message(format!("Retrying (attempt {}/{max})", attempt + 1));
        }
    }

    /// Finaliza o spinner e exibe onde a imagem foi gravada.
    pub fn complete(&self, path: &Path, output: &NodeOutput) {
        self.pb.finish_and_clear();
        println!(
            "  {} Wrote {}x{} image to {}",
            self.green.apply_to("✓"),
            output.image.width(),
            output.image.height(),
            path.display()
        );
    }

    /// Finaliza o spinner sem mensagem; o erro é reportado por [`report_error`].
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

/// Imprime o erro final em stderr.
///
/// Indisponibilidade persistente aparece em amarelo com uma dica de nova
/// tentativa; rejeições e demais erros aparecem em vermelho.
pub fn report_error(err: &PebbleError) {
    match err {
        PebbleError::Node(node_err @ NodeError::Unavailable { .. }) => {
            let yellow = Style::new().yellow().bold();
            eprintln!("  {} {node_err}", yellow.apply_to("✗"));
            eprintln!("    The service stayed unavailable; try again later.");
        }
        other => {
            let red = Style::new().red().bold();
            eprintln!("  {} {other}", red.apply_to("✗"));
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars && !text.contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(max_chars).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_single_lines() {
        assert_eq!(truncate("a cat", 60), "a cat");
    }

    #[test]
    fn truncate_cuts_long_or_multiline_text() {
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("first\nsecond", 60), "first…");
        assert_eq!(truncate("", 60), "");
    }
}
