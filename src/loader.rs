//! File loading for the CLI. JSON files are recognised by extension, other
//! files are read in the textual formats of [`crate::parser`].

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::goal_model::GoalModel;
use crate::mapping::MappingTable;
use crate::parser::{parse_all, parse_input, parse_mapping, transform_input};
use crate::petri_net::ProcessModel;

fn read(path: &Path) -> LoadResult<String> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn from_json<T: DeserializeOwned>(path: &Path, contents: &str) -> LoadResult<T> {
    serde_json::from_str(contents).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a net in the textual format.
pub fn parse_process_model(input: &str) -> LoadResult<ProcessModel> {
    let raw = parse_all(input, parse_input::parse)?;
    transform_input::transform(raw)
}

/// Parses `transition -> element` lines.
pub fn parse_mapping_table(input: &str) -> LoadResult<MappingTable> {
    let pairs = parse_all(input, parse_mapping::parse)?;
    Ok(pairs.into_iter().collect())
}

pub fn load_process_model(path: &Path) -> LoadResult<ProcessModel> {
    let contents = read(path)?;
    let model = if is_json(path) {
        from_json(path, &contents)?
    } else {
        parse_process_model(&contents)?
    };
    debug!(
        path = %path.display(),
        places = model.places().len(),
        transitions = model.transitions().len(),
        arcs = model.arcs().len(),
        "loaded process model"
    );
    Ok(model)
}

pub fn load_goal_model(path: &Path) -> LoadResult<GoalModel> {
    let model: GoalModel = from_json(path, &read(path)?)?;
    debug!(
        path = %path.display(),
        elements = model.elements().len(),
        refinements = model.refinements().len(),
        contributions = model.contributions().len(),
        "loaded goal model"
    );
    Ok(model)
}

pub fn load_mapping(path: &Path) -> LoadResult<MappingTable> {
    let contents = read(path)?;
    let table = if is_json(path) {
        from_json(path, &contents)?
    } else {
        parse_mapping_table(&contents)?
    };
    debug!(path = %path.display(), entries = table.len(), "loaded mapping");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_model_rejects_trailing_garbage() {
        let err = parse_process_model("{\nt: p0 -> p1\n}\nNet { p0, p1 }\nextra").unwrap_err();
        assert!(matches!(err, LoadError::Syntax(_)));
    }

    #[test]
    fn test_parse_mapping_table_reports_bad_line() {
        let err = parse_mapping_table("t0 -> A\nbroken line\n").unwrap_err();
        assert!(matches!(err, LoadError::Syntax(ref msg) if msg.contains("broken")));
    }

    #[test]
    fn test_missing_file() {
        let err = load_goal_model(Path::new("/nonexistent/goals.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_json_extension() {
        assert!(is_json(Path::new("model.JSON")));
        assert!(!is_json(Path::new("model.pn")));
    }
}
