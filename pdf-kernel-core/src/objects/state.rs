use bitflags::bitflags;

bitflags! {
    /// Lifecycle flags carried by indirect references and composite objects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjectState: u16 {
        /// Object number is free and may be handed out again
        const FREE = 1 << 0;
        /// Changed since the document was opened; written in append mode
        const MODIFIED = 1 << 1;
        /// Reachable from a flushed object and still waiting to be written
        const MUST_BE_FLUSHED = 1 << 2;
        /// Promoted to an indirect object whenever it is written as a child
        const MUST_BE_INDIRECT = 1 << 3;
        /// Being loaded from the original file
        const READING = 1 << 4;
        /// Written to the output
        const FLUSHED = 1 << 5;
        /// Lives inside an object stream of the original file
        const ORIGINAL_OBJECT_STREAM = 1 << 6;
        /// Keep the in-memory object after it has been flushed
        const FORBID_RELEASE = 1 << 7;
        /// Released after flushing; any further write is an error
        const READ_ONLY = 1 << 8;
    }
}
