use crate::FromNewick;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::{Display, Formatter};

/// A [`Branch`] in the [`Phylogeny`](crate::Phylogeny), stored on the edge from parent to child.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Branch {
    /// [`Branch`] length (ex. 0.1), [`None`] when the input did not specify one.
    pub length: Option<f64>,
}

#[rustfmt::skip]
impl AsPrimitive<f64> for Branch { fn as_(self) -> f64 { self.length.unwrap_or(0.0) } }
#[rustfmt::skip]
impl Display for Branch { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.length.unwrap_or(0.0)) } }

impl Branch {
    pub fn new(length: Option<f64>) -> Self {
        Branch { length }
    }
}

impl FromNewick for Branch {
    /// Returns a [`Branch`] created from the length suffix of a Newick node.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use phyloacc_phylo::{Branch, FromNewick};
    ///
    /// assert_eq!(Branch::from_newick("A")?, Branch { length: None });
    /// assert_eq!(Branch::from_newick("A:0.25")?, Branch { length: Some(0.25) });
    /// assert_eq!(Branch::from_newick(":2")?, Branch { length: Some(2.0) });
    /// assert!(Branch::from_newick("A:x").is_err());
    /// assert!(Branch::from_newick("A:-1").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_newick(newick: &str) -> Result<Branch, Report> {
        let newick = newick.trim().trim_end_matches(';');
        let length = match newick.rsplit_once(':') {
            Some((_label, length)) => {
                let length: f64 = length
                    .trim()
                    .parse()
                    .wrap_err_with(|| eyre!("Failed to parse branch length: {newick}"))?;
                if !length.is_finite() || length < 0.0 {
                    return Err(eyre!("Branch length must be a non-negative number: {newick}"));
                }
                Some(length)
            }
            None => None,
        };

        Ok(Branch { length })
    }
}
