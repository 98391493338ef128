// Git collaborator: synchronous subprocess calls into the watched working tree.

pub mod worker;
