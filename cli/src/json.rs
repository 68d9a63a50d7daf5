use anyhow::Result;
use demine_core::ScoreStore;
use demine_protocol::Session;
use std::io::{BufRead, Write};

/// One JSON request per input line, one JSON response per output line.
pub fn run<S>(input: impl BufRead, mut output: impl Write, store: &mut S) -> Result<()>
where
    S: ScoreStore<Error = anyhow::Error>,
{
    let mut session = Session::new(store.load()?);

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = session.handle_json(&line);
        writeln!(output, "{reply}")?;
        output.flush()?;

        if session.take_scores_changed() {
            // stdout carries only responses, so a failed save is only logged
            if let Err(err) = store.save(session.scores()) {
                log::warn!("Failed to save scores: {:#}", err);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use demine_core::ScoreBoard;
    use serde_json::Value;

    #[derive(Debug, Default)]
    struct MemoryStore {
        saves: usize,
        read_only: bool,
    }

    impl ScoreStore for MemoryStore {
        type Error = anyhow::Error;

        fn load(&mut self) -> Result<ScoreBoard> {
            Ok(ScoreBoard::default())
        }

        fn save(&mut self, _board: &ScoreBoard) -> Result<()> {
            anyhow::ensure!(!self.read_only, "disk full");
            self.saves += 1;
            Ok(())
        }
    }

    #[test]
    fn answers_each_line() {
        let script = concat!(
            r#"{"type":"status"}"#,
            "\n\n",
            r#"{"type":"new_game","width":4,"height":4,"mines":1,"seed":7}"#,
            "\n",
            "garbage\n",
        );
        let mut output = Vec::new();

        run(script.as_bytes(), &mut output, &mut MemoryStore::default()).unwrap();

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["type"], "error");
        assert_eq!(replies[1]["type"], "status");
        assert_eq!(replies[1]["snapshot"]["state"], "NotStarted");
        assert_eq!(replies[2]["type"], "error");
    }

    #[test]
    fn saves_after_a_win() {
        // one mine on a 2x1 board: whichever cell opens first is safe and wins
        let script = concat!(
            r#"{"type":"new_game","width":2,"height":1,"mines":1,"seed":3}"#,
            "\n",
            r#"{"type":"reveal","x":0,"y":0}"#,
            "\n",
        );
        let mut output = Vec::new();
        let mut store = MemoryStore::default();

        run(script.as_bytes(), &mut output, &mut store).unwrap();

        assert_eq!(store.saves, 1);
        assert!(String::from_utf8(output).unwrap().contains(r#""type":"won""#));
    }

    #[test]
    fn failed_save_keeps_answering() {
        let script = concat!(
            r#"{"type":"new_game","width":2,"height":1,"mines":1,"seed":3}"#,
            "\n",
            r#"{"type":"reveal","x":0,"y":0}"#,
            "\n",
            r#"{"type":"scores","mines":1}"#,
            "\n",
        );
        let mut output = Vec::new();
        let mut store = MemoryStore {
            read_only: true,
            ..Default::default()
        };

        run(script.as_bytes(), &mut output, &mut store).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(store.saves, 0);
        assert_eq!(output.lines().count(), 3, "{output}");
        assert!(output.contains(r#""type":"scores""#), "{output}");
    }
}
