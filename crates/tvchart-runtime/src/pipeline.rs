use crate::command::{Command, CommandContext, SharedLibrary, UndoableCommand};
use crate::error::CommandError;

/// Runs commands against a shared context and keeps the undo history.
///
/// Only commands that executed successfully and support undo are pushed. A failed
/// undo is put back so the user can retry it.
pub struct CommandPipeline {
    ctx: CommandContext,
    undo_stack: Vec<Box<dyn UndoableCommand>>,
}

impl CommandPipeline {
    pub fn new(ctx: CommandContext) -> Self {
        Self {
            ctx,
            undo_stack: Vec::new(),
        }
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub fn library(&self) -> &SharedLibrary {
        &self.ctx.library
    }

    pub async fn execute<C>(&mut self, mut command: C) -> Result<C::Output, CommandError>
    where
        C: Command + 'static,
    {
        let output = command.execute(&self.ctx).await?;
        if let Some(undoable) = Box::new(command).into_undoable() {
            tracing::debug!(description = %undoable.undo_description(), "Pushed undo entry");
            self.undo_stack.push(undoable);
        }
        Ok(output)
    }

    /// Undo the most recent command. `Ok(None)` when there is nothing to undo.
    pub async fn undo(&mut self) -> Result<Option<Box<dyn UndoableCommand>>, CommandError> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(None);
        };
        match command.undo(&self.ctx).await {
            Ok(()) => Ok(Some(command)),
            Err(e) => {
                self.undo_stack.push(command);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn peek_undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.undo_description())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}
