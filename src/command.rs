use crate::body::{Body, Define};
use crate::schema::Arity;

/// A named sub-parser selected by the first input token.
///
/// A command has its own options, arguments, help and observers. Its result map starts with
/// `name: []`, which collects the free tokens following the command when it was declared with a
/// [`Trailing`](crate::Trailing) bound.
pub struct Command {
    pub(crate) name: String,
    pub(crate) body: Body,
    pub(crate) arity: Option<Arity>,
}

impl Command {
    pub(crate) fn new(name: String, arity: Option<Arity>) -> Self {
        Self { name, body: Body::for_command(), arity }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Define for Command {
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
