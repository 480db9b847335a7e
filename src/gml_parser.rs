//! GML topology import.
//!
//! Reads the subset of GML used for switch topologies:
//!
//! ```text
//! graph [
//!   node [ id 0 label "S1" ]
//!   node [ id 1 label "S2" ]
//!   edge [ source 0 target 1 weight 3 ]
//! ]
//! ```
//!
//! Unknown keys are kept as string attributes. A node is named by its label
//! when it has one, otherwise by its numeric id. An edge's weight comes from
//! `weight`, then `cost`, then defaults to 1.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use crate::controller::Controller;
use crate::error::ControllerError;
use crate::events::EventSink;
use crate::topology::{NodeId, Weight, DEFAULT_WEIGHT};

/// Errors that can occur while reading or validating a GML topology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GmlError {
    #[error("line {line}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, line: usize },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line: usize,
    },

    #[error("{element} missing required '{field}' attribute")]
    MissingField {
        element: &'static str,
        field: &'static str,
    },

    #[error("duplicate node id {0}")]
    DuplicateId(u32),

    #[error("duplicate node name '{0}'")]
    DuplicateName(String),

    #[error("edge references non-existent node {0}")]
    DanglingEdge(u32),

    #[error("edge connects node {0} to itself")]
    SelfLoop(u32),

    #[error("edge {source_id}-{target_id}: invalid weight '{value}'")]
    InvalidWeight {
        source_id: u32,
        target_id: u32,
        value: String,
    },
}

/// Represents a node in a GML graph
#[derive(Debug, Clone)]
pub struct GmlNode {
    pub id: u32,
    pub label: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl GmlNode {
    /// Switch name: the label if present, else the numeric id
    pub fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Represents an edge in a GML graph
#[derive(Debug, Clone)]
pub struct GmlEdge {
    pub source: u32,
    pub target: u32,
    pub attributes: HashMap<String, String>,
}

impl GmlEdge {
    /// Link weight from `weight` or `cost`, defaulting to 1
    pub fn weight(&self) -> Result<Weight, GmlError> {
        let raw = self
            .attributes
            .get("weight")
            .or_else(|| self.attributes.get("cost"));
        let Some(raw) = raw else {
            return Ok(DEFAULT_WEIGHT);
        };

        let invalid = || GmlError::InvalidWeight {
            source_id: self.source,
            target_id: self.target,
            value: raw.clone(),
        };
        // Integral floats such as "2.0" are accepted
        let value = match raw.parse::<Weight>() {
            Ok(value) => value,
            Err(_) => {
                let float = raw.parse::<f64>().map_err(|_| invalid())?;
                if float.fract() != 0.0 || float < 1.0 || float > f64::from(Weight::MAX) {
                    return Err(invalid());
                }
                float as Weight
            }
        };
        if value == 0 {
            return Err(invalid());
        }
        Ok(value)
    }
}

/// Represents a complete GML graph
#[derive(Debug, Clone, Default)]
pub struct GmlGraph {
    pub nodes: Vec<GmlNode>,
    pub edges: Vec<GmlEdge>,
    pub attributes: HashMap<String, String>,
}

impl GmlGraph {
    /// Check ids, names, edge endpoints and weights.
    ///
    /// A graph that passes loads into a controller without further errors.
    pub fn validate(&self) -> Result<(), GmlError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(GmlError::DuplicateId(node.id));
            }
            let name = node.name();
            if !names.insert(name.clone()) {
                return Err(GmlError::DuplicateName(name));
            }
        }

        for edge in &self.edges {
            for endpoint in [edge.source, edge.target] {
                if !ids.contains(&endpoint) {
                    return Err(GmlError::DanglingEdge(endpoint));
                }
            }
            if edge.source == edge.target {
                return Err(GmlError::SelfLoop(edge.source));
            }
            edge.weight()?;
        }

        Ok(())
    }

    fn names_by_id(&self) -> HashMap<u32, String> {
        self.nodes.iter().map(|node| (node.id, node.name())).collect()
    }
}

/// Token types for GML parsing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(String),
    String(String),
    LeftBracket,
    RightBracket,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Identifier(id) => format!("identifier '{}'", id),
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::LeftBracket => "'['".to_string(),
            Token::RightBracket => "']'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

struct Lexer<'s> {
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    line: usize,
}

impl<'s> Lexer<'s> {
    fn new(input: &'s str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }

    fn skip_trivia(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == '#' {
                while let Some(&ch) = self.chars.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> Result<String, GmlError> {
        let start = self.line;
        self.bump(); // opening quote
        let mut result = String::new();
        loop {
            match self.bump() {
                None => return Err(GmlError::UnterminatedString { line: start }),
                Some('"') => return Ok(result),
                Some('\\') => match self.bump() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => return Err(GmlError::UnterminatedString { line: start }),
                },
                Some(ch) => result.push(ch),
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+') {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        word
    }

    fn next_token(&mut self) -> Result<(Token, usize), GmlError> {
        self.skip_trivia();
        let line = self.line;
        let token = match self.chars.peek().copied() {
            None => Token::Eof,
            Some('[') => {
                self.bump();
                Token::LeftBracket
            }
            Some(']') => {
                self.bump();
                Token::RightBracket
            }
            Some('"') => Token::String(self.read_string()?),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Token::Identifier(self.read_word()),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '+' => Token::Number(self.read_word()),
            Some(ch) => return Err(GmlError::UnexpectedChar { ch, line }),
        };
        Ok((token, line))
    }
}

struct Parser<'s> {
    lexer: Lexer<'s>,
    current: Token,
    line: usize,
}

impl<'s> Parser<'s> {
    fn new(input: &'s str) -> Result<Self, GmlError> {
        let mut lexer = Lexer::new(input);
        let (current, line) = lexer.next_token()?;
        Ok(Self { lexer, current, line })
    }

    fn advance(&mut self) -> Result<(), GmlError> {
        let (token, line) = self.lexer.next_token()?;
        self.current = token;
        self.line = line;
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> GmlError {
        GmlError::Unexpected {
            expected: expected.to_string(),
            found: self.current.describe(),
            line: self.line,
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), GmlError> {
        if self.current == token {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn value(&mut self) -> Result<String, GmlError> {
        match &self.current {
            Token::Identifier(val) | Token::Number(val) | Token::String(val) => {
                let val = val.clone();
                self.advance()?;
                Ok(val)
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    fn number(&mut self, field: &'static str) -> Result<u32, GmlError> {
        let line = self.line;
        let raw = self.value()?;
        raw.parse::<u32>().map_err(|_| GmlError::InvalidNumber {
            field,
            value: raw,
            line,
        })
    }

    /// Skip a nested `key [ ... ]` block we do not interpret (e.g. `graphics`)
    fn skip_block(&mut self) -> Result<(), GmlError> {
        self.expect(Token::LeftBracket, "'['")?;
        let mut depth = 1;
        while depth > 0 {
            match self.current {
                Token::LeftBracket => depth += 1,
                Token::RightBracket => depth -= 1,
                Token::Eof => return Err(self.unexpected("']'")),
                _ => {}
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Parse the `key value` pairs of an element body up to its closing bracket
    fn attributes<F>(&mut self, mut field: F) -> Result<HashMap<String, String>, GmlError>
    where
        F: FnMut(&mut Self, &str) -> Result<bool, GmlError>,
    {
        let mut attributes = HashMap::new();
        self.expect(Token::LeftBracket, "'['")?;
        while self.current != Token::RightBracket {
            let Token::Identifier(key) = &self.current else {
                return Err(self.unexpected("an attribute name"));
            };
            let key = key.clone();
            self.advance()?;
            if field(self, &key)? {
                continue;
            }
            if self.current == Token::LeftBracket {
                self.skip_block()?;
            } else {
                let value = self.value()?;
                attributes.insert(key, value);
            }
        }
        self.expect(Token::RightBracket, "']'")?;
        Ok(attributes)
    }

    fn node(&mut self) -> Result<GmlNode, GmlError> {
        let mut id = None;
        let mut label = None;
        let attributes = self.attributes(|parser, key| match key {
            "id" => {
                id = Some(parser.number("node id")?);
                Ok(true)
            }
            "label" => {
                label = Some(parser.value()?);
                Ok(true)
            }
            _ => Ok(false),
        })?;

        Ok(GmlNode {
            id: id.ok_or(GmlError::MissingField {
                element: "node",
                field: "id",
            })?,
            label,
            attributes,
        })
    }

    fn edge(&mut self) -> Result<GmlEdge, GmlError> {
        let mut source = None;
        let mut target = None;
        let attributes = self.attributes(|parser, key| match key {
            "source" => {
                source = Some(parser.number("edge source")?);
                Ok(true)
            }
            "target" => {
                target = Some(parser.number("edge target")?);
                Ok(true)
            }
            _ => Ok(false),
        })?;

        Ok(GmlEdge {
            source: source.ok_or(GmlError::MissingField {
                element: "edge",
                field: "source",
            })?,
            target: target.ok_or(GmlError::MissingField {
                element: "edge",
                field: "target",
            })?,
            attributes,
        })
    }

    fn graph(&mut self) -> Result<GmlGraph, GmlError> {
        // Top-level keys such as `Creator "..."` may precede the graph
        loop {
            match &self.current {
                Token::Identifier(key) if key == "graph" => break,
                Token::Identifier(_) => {
                    self.advance()?;
                    if self.current == Token::LeftBracket {
                        self.skip_block()?;
                    } else {
                        self.value()?;
                    }
                }
                _ => return Err(self.unexpected("'graph'")),
            }
        }
        self.advance()?;
        let mut graph = GmlGraph::default();
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        graph.attributes = self.attributes(|parser, key| match key {
            "node" => {
                nodes.push(parser.node()?);
                Ok(true)
            }
            "edge" => {
                edges.push(parser.edge()?);
                Ok(true)
            }
            _ => Ok(false),
        })?;

        if self.current != Token::Eof {
            return Err(self.unexpected("end of input"));
        }
        graph.nodes = nodes;
        graph.edges = edges;
        Ok(graph)
    }
}

/// Parse GML text into a graph
pub fn parse_gml(input: &str) -> Result<GmlGraph, GmlError> {
    Parser::new(input)?.graph()
}

/// Read and parse a GML file
pub fn parse_gml_file(path: &Path) -> Result<GmlGraph> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read GML file '{}'", path.display()))?;
    let graph = parse_gml(&content)
        .wrap_err_with(|| format!("Failed to parse GML file '{}'", path.display()))?;
    log::info!(
        "Parsed GML topology {}: {} nodes, {} edges",
        path.display(),
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(graph)
}

/// Apply a validated graph to a controller through its normal operations.
///
/// Returns the number of (nodes, links) added.
pub fn load_into<S: EventSink>(graph: &GmlGraph, controller: &mut Controller<S>) -> Result<(usize, usize)> {
    graph.validate()?;
    let names = graph.names_by_id();

    let mut nodes_added = 0;
    for node in &graph.nodes {
        if controller.add_node(NodeId::from(node.name())) {
            nodes_added += 1;
        }
    }

    let mut links_added = 0;
    for edge in &graph.edges {
        let (Some(src), Some(dst)) = (names.get(&edge.source), names.get(&edge.target)) else {
            continue;
        };
        match controller.add_link(src, dst, edge.weight()?) {
            Ok(_) => links_added += 1,
            // GML multigraphs may list a link twice
            Err(ControllerError::DuplicateLink { .. }) => {
                log::warn!("Ignoring duplicate GML edge {}-{}", src, dst);
            }
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("Failed to add GML edge {}-{}", src, dst));
            }
        }
    }

    Ok((nodes_added, links_added))
}
