//! Chromosome id to name lookup.

use noodles::sam;

/// Resolves a reference sequence id to its name.
pub trait ChromosomeDictionary {
    /// Name of reference `id`, or `None` if the id is unknown.
    fn name_of(&self, id: usize) -> Option<String>;

    /// Number of reference sequences.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChromosomeDictionary for sam::Header {
    fn name_of(&self, id: usize) -> Option<String> {
        self.reference_sequences()
            .get_index(id)
            .map(|(name, _)| String::from_utf8_lossy(name.as_ref()).into_owned())
    }

    fn len(&self) -> usize {
        self.reference_sequences().len()
    }
}

impl ChromosomeDictionary for [String] {
    fn name_of(&self, id: usize) -> Option<String> {
        self.get(id).cloned()
    }

    fn len(&self) -> usize {
        <[String]>::len(self)
    }
}

impl ChromosomeDictionary for Vec<String> {
    fn name_of(&self, id: usize) -> Option<String> {
        self.as_slice().name_of(id)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}
