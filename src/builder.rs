//! Template building and rendering
//!
//! [`TemplateBuilder`] is the entry point: configure delimiters, register
//! imports, parameters and custom blocks, then `build()` to tokenize,
//! generate and compile the unit. The resulting [`Template`] renders any
//! number of times against different arguments.

use std::collections::BTreeMap;

use rhai::Dynamic;
use tracing::debug;

use crate::blocks::CustomBlock;
use crate::codegen::Generator;
use crate::config::TemplateConfig;
use crate::error::{CompilerError, ConfigError, Error, ErrorDetail, RuntimeError};
use crate::eval::RhaiToolchain;
use crate::lexer::Tokenizer;
use crate::map::SourceMap;
use crate::toolchain::Toolchain;

pub struct TemplateBuilder<T: Toolchain = RhaiToolchain> {
    template: String,
    config: TemplateConfig,
    toolchain: T,
    imports: Vec<(String, String)>,
    parameters: Vec<String>,
    custom_blocks: BTreeMap<String, Box<dyn CustomBlock>>,
}

impl TemplateBuilder<RhaiToolchain> {
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_toolchain(template, RhaiToolchain::new())
    }
}

impl<T: Toolchain> TemplateBuilder<T> {
    /// Build against a caller-supplied toolchain instead of the stock one.
    pub fn with_toolchain(template: impl Into<String>, toolchain: T) -> Self {
        Self {
            template: template.into(),
            config: TemplateConfig::default(),
            toolchain,
            imports: Vec::new(),
            parameters: Vec::new(),
            custom_blocks: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TemplateConfig {
        &mut self.config
    }

    pub fn with_config(mut self, config: TemplateConfig) -> Self {
        self.config = config;
        self
    }

    /// Import a module into the unit under `alias`.
    pub fn add_import(&mut self, path: impl Into<String>, alias: impl Into<String>) {
        self.imports.push((path.into(), alias.into()));
    }

    pub fn with_import(mut self, path: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_import(path, alias);
        self
    }

    /// Declare a named argument that `render` will supply, in order.
    pub fn add_parameter(&mut self, name: impl Into<String>) {
        self.parameters.push(name.into());
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.add_parameter(name);
        self
    }

    /// Register a custom block under its default identifier.
    pub fn add_custom_block(
        &mut self,
        block: impl CustomBlock + 'static,
    ) -> Result<(), ConfigError> {
        let identifier = block.default_identifier().to_string();
        self.register(identifier, Box::new(block))
    }

    /// Register a custom block under an explicit identifier.
    pub fn add_custom_block_named(
        &mut self,
        block: impl CustomBlock + 'static,
        identifier: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.register(identifier.into(), Box::new(block))
    }

    pub fn with_custom_block(
        mut self,
        block: impl CustomBlock + 'static,
    ) -> Result<Self, ConfigError> {
        self.add_custom_block(block)?;
        Ok(self)
    }

    pub fn with_custom_block_named(
        mut self,
        block: impl CustomBlock + 'static,
        identifier: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        self.add_custom_block_named(block, identifier)?;
        Ok(self)
    }

    /// Imports registered so far, as `(path, alias)` pairs.
    pub fn imports(&self) -> &[(String, String)] {
        &self.imports
    }

    /// Parameters declared so far, in declaration order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn custom_block_identifiers(&self) -> impl Iterator<Item = &str> {
        self.custom_blocks.keys().map(String::as_str)
    }

    fn register(
        &mut self,
        identifier: String,
        block: Box<dyn CustomBlock>,
    ) -> Result<(), ConfigError> {
        if identifier.is_empty() || identifier.chars().any(char::is_whitespace) {
            return Err(ConfigError {
                failures: vec![format!(
                    "custom block identifier {identifier:?} must be non-empty without whitespace"
                )],
            });
        }
        if self.custom_blocks.contains_key(&identifier) {
            return Err(ConfigError {
                failures: vec![format!(
                    "custom block identifier {identifier:?} is already registered"
                )],
            });
        }
        self.custom_blocks.insert(identifier, block);
        Ok(())
    }

    /// Tokenize, generate and compile the template.
    pub fn build(self) -> Result<Template<T>, Error> {
        let failures = self.config.validate(!self.custom_blocks.is_empty());
        if !failures.is_empty() {
            return Err(ConfigError { failures }.into());
        }

        let tokenizer = Tokenizer::new(&self.config, !self.custom_blocks.is_empty(), &self.toolchain);
        let tokens = tokenizer.tokenize(&self.template)?;
        debug!(tokens = tokens.len(), "template tokenized");

        let generator = Generator::new(&self.toolchain, &self.custom_blocks);
        let map = generator.generate(&self.template, &tokens, &self.imports)?;

        let unit = match self.toolchain.compile(map.generated_code()) {
            Ok(unit) => unit,
            Err(diagnostics) => {
                let details = diagnostics
                    .into_iter()
                    .map(|d| {
                        ErrorDetail::new(d.message, map.generating_location_at(d.line, d.column))
                    })
                    .collect();
                return Err(CompilerError {
                    message: "generated unit failed to compile".into(),
                    details,
                }
                .into());
            }
        };
        debug!("template compiled");

        Ok(Template {
            toolchain: self.toolchain,
            unit,
            map,
            parameters: self.parameters,
        })
    }
}

/// A compiled template, reusable across renders.
pub struct Template<T: Toolchain = RhaiToolchain> {
    toolchain: T,
    unit: T::Unit,
    map: SourceMap,
    parameters: Vec<String>,
}

impl<T: Toolchain> Template<T> {
    /// Render with one argument per declared parameter, in declaration
    /// order. An argument count mismatch fails before the unit runs; other
    /// failures carry the template position of the failing code.
    pub fn render(&self, args: impl IntoIterator<Item = Dynamic>) -> Result<String, Error> {
        let args: Vec<Dynamic> = args.into_iter().collect();
        if args.len() != self.parameters.len() {
            let message = format!(
                "parameter count mismatch: {} declared, {} supplied",
                self.parameters.len(),
                args.len()
            );
            return Err(RuntimeError {
                location: self.map.generating_location(0),
                cause: message.clone().into(),
                message,
            }
            .into());
        }
        let named: Vec<(String, Dynamic)> =
            self.parameters.iter().cloned().zip(args).collect();
        self.toolchain
            .invoke(&self.unit, &named)
            .map_err(|failure| {
                let location = match failure.line {
                    Some(line) => self
                        .map
                        .generating_location_at(line, failure.column.unwrap_or(1)),
                    None => self.map.generating_location(0),
                };
                RuntimeError {
                    message: failure.message,
                    location,
                    cause: failure.cause,
                }
                .into()
            })
    }

    /// The position map built while generating the unit.
    pub fn source_map(&self) -> &SourceMap {
        &self.map
    }

    /// The synthesized unit source.
    pub fn generated_source(&self) -> &str {
        self.map.generated_code()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}
