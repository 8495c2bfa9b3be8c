//! Animal-sound pipeline built on a `HandlerContainer`.

use std::collections::HashMap;

use mutableware_core::{
    AddOptions, BoxError, Context, FnHandler, Handler, HandlerContainer, HandlerId, HandlerInfo, Next,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;

/// Response of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub sound: String,
    /// Handler stack at the handler that knew the animal.
    pub answered_by: Vec<HandlerInfo>,
}

/// Answers for one animal and passes everything else down the chain.
pub struct AnimalSoundHandler {
    animal: String,
    sound: String,
}

impl AnimalSoundHandler {
    pub fn new(animal: impl Into<String>, sound: impl Into<String>) -> Self {
        Self {
            animal: animal.into(),
            sound: sound.into(),
        }
    }
}

impl Handler<String, Answer> for AnimalSoundHandler {
    fn handle(&self, ctx: &Context, request: String, next: &Next<String, Answer>) -> Result<Answer, BoxError> {
        if request == self.animal {
            return Ok(Answer {
                sound: self.sound.clone(),
                answered_by: ctx.handler_stack(),
            });
        }
        // not ours
        next(ctx, request)
    }
}

pub struct Pipeline {
    container: HandlerContainer<String, Answer>,
    rules: HashMap<String, HandlerId>,
}

impl Pipeline {
    pub fn build(config: &PipelineConfig) -> Self {
        let container = HandlerContainer::<String, Answer>::new();

        // oldest handler: catches whatever nobody else knew
        container.add_fn(
            |_ctx, animal: String, _next| Err(format!("unknown animal {animal:?}").into()),
            AddOptions::new().name("unknown"),
        );

        let mut pipeline = Self {
            container,
            rules: HashMap::new(),
        };
        for rule in &config.sounds {
            pipeline.add_rule(&rule.animal, &rule.sound);
        }

        if config.loud {
            pipeline.container.add_fn(
                |ctx, animal, next| {
                    let mut answer = next(ctx, animal)?;
                    answer.sound = format!("{}!", answer.sound.to_uppercase());
                    Ok(answer)
                },
                AddOptions::new().name("loud"),
            );
        }

        // runs before everything else
        pipeline.container.add(
            FnHandler::validating(|ctx, animal: String, next| {
                if animal.trim().is_empty() {
                    return Err("empty animal name".into());
                }
                next(ctx, animal)
            }),
            AddOptions::new().name("non-empty"),
        );

        for rule in &config.swaps {
            pipeline.swap_rule(&rule.animal, &rule.sound);
        }
        for animal in &config.remove {
            pipeline.remove_rule(animal);
        }

        info!(handlers = pipeline.container.len(), "pipeline built");
        pipeline
    }

    pub fn add_rule(&mut self, animal: &str, sound: &str) -> HandlerId {
        let id = self
            .container
            .add(AnimalSoundHandler::new(animal, sound), AddOptions::new().name(animal));
        self.rules.insert(animal.to_string(), id);
        id
    }

    /// Replaces the rule for `animal` in place, or adds one if there is none.
    pub fn swap_rule(&mut self, animal: &str, sound: &str) -> HandlerId {
        let target = self.rules.get(animal).copied().unwrap_or(HandlerId::NONE);
        if target.is_none() {
            warn!(animal, "no rule to swap, adding a new one");
        }
        let id = self.container.add(
            AnimalSoundHandler::new(animal, sound),
            AddOptions::new().name(animal).swap(target),
        );
        self.rules.insert(animal.to_string(), id);
        id
    }

    pub fn remove_rule(&mut self, animal: &str) {
        match self.rules.remove(animal) {
            Some(id) => self.container.remove(id),
            None => warn!(animal, "no rule to remove"),
        }
    }

    pub fn answer(&self, animal: &str) -> Result<Answer, BoxError> {
        let ctx = Context::new();
        self.container.validate(&ctx, animal.to_string())?;
        self.container.handle(&ctx, animal.to_string())
    }

    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.container.handlers()
    }
}
