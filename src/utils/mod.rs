pub mod time;

/// Random id used to tell diagrams apart in logs.
pub fn shortid() -> String {
    nanoid::nanoid!(10)
}
