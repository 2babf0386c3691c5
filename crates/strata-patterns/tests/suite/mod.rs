mod dominance;
mod exactness;
mod fixtures;
mod switch;
