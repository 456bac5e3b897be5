//! Named command and query tables
//!
//! Scripts and automated players drive the world through names. The registry
//! is built once; commands may mutate the world, queries only read it. Every
//! handler validates its arguments before touching the world.

use ahash::AHashMap;
use serde_json::Value;
use thiserror::Error;

use crate::core::error::ValidationError;
use crate::core::types::Point;
use crate::world::scenario::World;

pub type CommandFn = fn(&mut World, &[Value]) -> Result<Value, CommandError>;
pub type QueryFn = fn(&World, &[Value]) -> Result<Value, CommandError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Bad arguments for {name}: {reason}")]
    BadArguments { name: &'static str, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub struct CommandRegistry {
    commands: AHashMap<&'static str, CommandFn>,
    queries: AHashMap<&'static str, QueryFn>,
}

impl CommandRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            commands: AHashMap::new(),
            queries: AHashMap::new(),
        }
    }

    /// Registry with every built-in command and query
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::handlers::register_all(&mut registry);
        registry
    }

    pub fn register_command(&mut self, name: &'static str, handler: CommandFn) {
        self.commands.insert(name, handler);
    }

    pub fn register_query(&mut self, name: &'static str, handler: QueryFn) {
        self.queries.insert(name, handler);
    }

    /// Run a command against the live world
    pub fn execute(
        &self,
        name: &str,
        world: &mut World,
        args: &[Value],
    ) -> Result<Value, CommandError> {
        let handler = self
            .commands
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        let result = handler(world, args);
        if let Err(e) = &result {
            tracing::debug!("Command {} rejected: {}", name, e);
        }
        result
    }

    pub fn query(&self, name: &str, world: &World, args: &[Value]) -> Result<Value, CommandError> {
        let handler = self
            .queries
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        handler(world, args)
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn is_query(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    /// Command names, sorted
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Query names, sorted
    pub fn query_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.queries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Positional argument reader for one handler
pub struct Args<'a> {
    name: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Fails unless exactly `count` arguments were given
    pub fn new(name: &'static str, values: &'a [Value], count: usize) -> Result<Self, CommandError> {
        let args = Self { name, values };
        if values.len() != count {
            return Err(args.bad(format!("expected {} arguments, got {}", count, values.len())));
        }
        Ok(args)
    }

    fn bad(&self, reason: String) -> CommandError {
        CommandError::BadArguments {
            name: self.name,
            reason,
        }
    }

    fn value(&self, i: usize) -> Result<&'a Value, CommandError> {
        self.values
            .get(i)
            .ok_or_else(|| self.bad(format!("missing argument {}", i)))
    }

    /// Non-negative integer id
    pub fn id<I: From<u32>>(&self, i: usize) -> Result<I, CommandError> {
        let value = self.value(i)?;
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(I::from)
            .ok_or_else(|| self.bad(format!("argument {} is not an id: {}", i, value)))
    }

    pub fn ids<I: From<u32>>(&self, i: usize) -> Result<Vec<I>, CommandError> {
        let value = self.value(i)?;
        let err = || self.bad(format!("argument {} is not an id list: {}", i, value));
        value
            .as_array()
            .ok_or_else(err)?
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(I::from)
                    .ok_or_else(err)
            })
            .collect()
    }

    /// A point as `[x, y]`, `{"x": .., "y": ..}` or `"x,y"`
    pub fn point(&self, i: usize) -> Result<Point, CommandError> {
        let value = self.value(i)?;
        let err = || self.bad(format!("argument {} is not a point: {}", i, value));
        match value {
            Value::String(s) => s.parse().map_err(|_| err()),
            Value::Array(xy) => match xy.as_slice() {
                [x, y] => {
                    let coord = |v: &Value| v.as_i64().and_then(|n| i32::try_from(n).ok());
                    match (coord(x), coord(y)) {
                        (Some(x), Some(y)) => Ok(Point::new(x, y)),
                        _ => Err(err()),
                    }
                }
                _ => Err(err()),
            },
            Value::Object(_) => serde_json::from_value(value.clone()).map_err(|_| err()),
            _ => Err(err()),
        }
    }

    pub fn str(&self, i: usize) -> Result<&'a str, CommandError> {
        let value = self.value(i)?;
        value
            .as_str()
            .ok_or_else(|| self.bad(format!("argument {} is not a string: {}", i, value)))
    }
}
