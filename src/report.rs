/*!
Error printer for the command-line front end.

`main` returns `Result<(), Report>`, so any error that reaches it is printed
together with the chain of errors that caused it.
*/

use std::error::Error as StdError;
use std::fmt;

pub struct Report(Box<dyn StdError>);

impl Report {
    /// Iterates over the error and all of its sources, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(Some(&*self.0 as &(dyn StdError + 'static)), |&e| e.source())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0)?;

        let causes: Vec<_> = self.chain().skip(1).collect();
        if !causes.is_empty() {
            writeln!(f, "\nCaused by:")?;
            for (depth, cause) in causes.into_iter().enumerate() {
                writeln!(f, "  {}: {}", depth, cause)?;
            }
        }

        Ok(())
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        Report(e.into())
    }
}
