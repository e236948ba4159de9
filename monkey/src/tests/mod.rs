mod builtins;
mod env;
mod eval;
